use crate::time::TimeSource;
use std::time::{SystemTime, UNIX_EPOCH};

/// Reads the operating system's wall clock on every call.
///
/// This is the default time source for [`crate::SnowflakeGenerator::new`].
/// It follows any adjustment made to the system clock, including backward
/// jumps, which the generator reports as [`crate::Error::ClockRolledBack`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        unix_millis_now()
    }
}

/// Milliseconds since the Unix epoch. A clock set before 1970 reads as `0`.
pub(crate) fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}
