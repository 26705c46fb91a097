use crate::time::{TimeSource, system::unix_millis_now};
use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Instant,
};

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A time source that never goes backward.
///
/// The clock reads the wall clock exactly once, at construction, and from
/// then on advances with a monotonic [`Instant`]. Later wall-clock
/// adjustments (NTP slews, manual changes) are ignored, so a generator driven
/// by it never observes [`crate::Error::ClockRolledBack`]. The price is drift:
/// over long uptimes the reported time can diverge from the system clock.
///
/// Internally a background thread updates a shared atomic once per
/// millisecond, keeping syscalls off the hot path. The thread exits once the
/// last clone of the clock is dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    anchor_millis: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock anchored at the current wall-clock time.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use sleet::{MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// let before = clock.current_millis();
    /// std::thread::sleep(Duration::from_millis(5));
    /// assert!(clock.current_millis() >= before);
    /// ```
    pub fn new() -> Self {
        let start = Instant::now();
        let anchor_millis = unix_millis_now();

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = start.elapsed().as_millis() as u64;
                inner_ref.current.store(now_ms, Ordering::Relaxed);

                // Align to next tick after the current actual time
                tick = now_ms + 1;
            }
        });

        // Freshly created lock, cannot already be set.
        let _ = inner._handle.set(handle);

        Self {
            inner,
            anchor_millis,
        }
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.anchor_millis + self.inner.current.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backward() {
        let clock = MonotonicClock::new();
        let mut last = clock.current_millis();
        for _ in 0..10_000 {
            let now = clock.current_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn advances_with_elapsed_time() {
        let clock = MonotonicClock::new();
        let before = clock.current_millis();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.current_millis() > before);
    }

    #[test]
    fn anchored_near_wall_clock() {
        let clock = MonotonicClock::new();
        let wall = unix_millis_now();
        assert!(clock.current_millis().abs_diff(wall) < 1_000);
    }
}
