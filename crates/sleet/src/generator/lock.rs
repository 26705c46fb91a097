#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Components, Error, Result, SleetId,
    generator::{GeneratorConfig, Mutex, MutexGuard, Poll, SequenceState, StateSnapshot, Step},
    time::{SystemClock, TimeSource},
};

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// Each instance exclusively owns its `(last_millis, sequence)` state behind a
/// single mutex. The whole read-clock, compare, update sequence runs under
/// that lock, so many threads may call [`Self::next_id`] on one instance
/// (e.g. through an [`Arc`](std::sync::Arc)) without producing duplicates.
/// Instances with distinct datacenter/machine pairs share nothing and can run
/// fully in parallel.
///
/// ## Guarantees
/// - IDs from one instance are strictly increasing in completion order.
/// - Within one millisecond the sequence counts up from `0` to `4095`; the
///   4097th request spins until the clock reaches the next millisecond.
/// - A clock that moves backwards fails fast with
///   [`Error::ClockRolledBack`] and leaves the state untouched.
///
/// ## See Also
/// - [`Self::try_poll_id`] for a variant that never blocks
pub struct SnowflakeGenerator<T = SystemClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<SequenceState>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<SequenceState>,
    config: GeneratorConfig,
    time: T,
}

impl SnowflakeGenerator<SystemClock> {
    /// Creates a generator reading the system clock, anchored at
    /// [`crate::SLEET_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either identifier is outside
    /// `[0, 31]`.
    ///
    /// # Example
    /// ```
    /// use sleet::SnowflakeGenerator;
    ///
    /// let generator = SnowflakeGenerator::new(3, 7)?;
    /// let id = generator.next_id()?;
    ///
    /// let parts = generator.decode(id);
    /// assert_eq!((parts.datacenter_id, parts.machine_id), (3, 7));
    /// # Ok::<(), sleet::Error>(())
    /// ```
    pub fn new(datacenter_id: i64, machine_id: i64) -> Result<Self> {
        let config = GeneratorConfig::new(datacenter_id, machine_id)?;
        Ok(Self::from_config(config, SystemClock))
    }
}

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator from a validated config and an explicit
    /// [`TimeSource`].
    ///
    /// The state starts unset: the first call always issues sequence `0`.
    pub fn from_config(config: GeneratorConfig, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(SequenceState::default())),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(SequenceState::default()),
            config,
            time,
        }
    }

    /// Generates the next ID, spinning if the current millisecond is
    /// exhausted.
    ///
    /// The only blocking point is the exhaustion spin, which lasts until the
    /// time source reports a millisecond past the exhausted one. There is no
    /// timeout; wrap the call if one is needed.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRolledBack`] if the clock reads earlier than the last
    ///   issued millisecond
    /// - [`Error::ClockBeforeEpoch`] if the clock reads before the epoch
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (never with `parking-lot`)
    ///
    /// On error the state is unchanged.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SleetId> {
        let mut state = self.lock()?;
        let now = self.time.current_millis();

        let (millis, sequence) = match state.step(now)? {
            Step::Issue { millis, sequence } => (millis, sequence),
            Step::Exhausted { last_millis } => (self.wait_next_millis(last_millis), 0),
        };

        let id = self.encode(millis, sequence)?;
        state.commit(millis, sequence);
        Ok(id)
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Behaves like [`Self::next_id`] except that an exhausted millisecond
    /// yields [`Poll::Pending`] instead of a spin. Nothing is mutated in that
    /// case; a later call proceeds once the clock is past the exhausted
    /// millisecond.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll> {
        let mut state = self.lock()?;
        let now = self.time.current_millis();

        match state.step(now)? {
            Step::Issue { millis, sequence } => {
                let id = self.encode(millis, sequence)?;
                state.commit(millis, sequence);
                Ok(Poll::Ready { id })
            }
            Step::Exhausted { .. } => Ok(Poll::Pending { yield_for: 1 }),
        }
    }

    /// Splits an ID into its fields. Pure; never touches the state.
    pub fn decode(&self, id: SleetId) -> Components {
        id.decode()
    }

    /// Absolute milliseconds since the Unix epoch at which `id` was issued,
    /// assuming it came from a generator sharing this epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOverflow`] if the sum does not fit in a
    /// `u64`.
    pub fn timestamp_millis(&self, id: SleetId) -> Result<u64> {
        self.config.timestamp_millis(id)
    }

    /// Returns a copy of the current `(last_millis, sequence)` state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the lock is poisoned.
    pub fn state(&self) -> Result<StateSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    /// The config this generator was built with.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, SequenceState>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    fn encode(&self, millis: u64, sequence: u64) -> Result<SleetId> {
        let epoch = self.config.epoch_millis();
        let Some(offset) = millis.checked_sub(epoch) else {
            return Err(Error::ClockBeforeEpoch { now: millis, epoch });
        };
        Ok(SleetId::from_components(
            offset,
            self.config.datacenter_id(),
            self.config.machine_id(),
            sequence,
        ))
    }

    /// Busy-waits until the clock reads past `last_millis`. Called with the
    /// lock held.
    #[cold]
    fn wait_next_millis(&self, last_millis: u64) -> u64 {
        #[cfg(feature = "tracing")]
        tracing::debug!(last_millis, "sequence exhausted, waiting for next millisecond");
        loop {
            let now = self.time.current_millis();
            if now > last_millis {
                return now;
            }
            core::hint::spin_loop();
        }
    }
}
