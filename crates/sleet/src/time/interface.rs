use core::time::Duration;
use std::sync::Arc;

/// Default epoch: Thursday, January 23, 2025 07:50:26.436 UTC
///
/// Every [`crate::SleetId`] issued with the default configuration stores its
/// timestamp as an offset from this instant. Changing it breaks decoding of
/// previously issued IDs.
pub const SLEET_EPOCH: Duration = Duration::from_millis(1_737_618_626_436);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// Standard UNIX epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const UNIX_EPOCH: Duration = Duration::from_millis(0);

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in the real system clock, a monotonic
/// timer, or a mocked time source in tests.
///
/// The unit is **milliseconds since the Unix epoch**. Implementations may
/// occasionally report a value lower than a previous reading (NTP correction,
/// manual clock changes); the generator detects this and refuses to issue IDs
/// until the clock catches up.
///
/// # Example
///
/// ```
/// use sleet::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_737_618_626_436
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1_737_618_626_436);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
