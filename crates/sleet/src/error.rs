/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `sleet` can emit.
///
/// Every variant is surfaced to the immediate caller. A failed call never
/// leaves the generator in a partially updated state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A datacenter or machine identifier was outside `[0, 31]`.
    ///
    /// Only raised while building a [`crate::GeneratorConfig`], never during
    /// ID generation.
    #[error("{field} must be within [0, {max}], got {value}")]
    InvalidArgument {
        /// Name of the rejected field.
        field: &'static str,
        /// The rejected value.
        value: i64,
        /// Largest accepted value.
        max: u64,
    },

    /// The time source reported a millisecond earlier than the last one used
    /// to issue an ID.
    ///
    /// The generator does not retry. The caller decides whether to wait,
    /// retry or abort.
    #[error("clock moved backwards: last issued at {last_millis} ms, now {now} ms")]
    ClockRolledBack {
        /// Millisecond of the most recently issued ID.
        last_millis: u64,
        /// Millisecond reported by the time source.
        now: u64,
    },

    /// The time source reported a millisecond before the configured epoch.
    #[error("clock reads {now} ms which is before the epoch at {epoch} ms")]
    ClockBeforeEpoch {
        /// Millisecond reported by the time source.
        now: u64,
        /// Configured epoch, in milliseconds since the Unix epoch.
        epoch: u64,
    },

    /// An ID's offset added to the configured epoch does not fit in a `u64`.
    #[error("timestamp overflows u64: offset {millis_offset} ms past epoch {epoch} ms")]
    TimestampOverflow {
        /// Offset stored in the ID.
        millis_offset: u64,
        /// Configured epoch, in milliseconds since the Unix epoch.
        epoch: u64,
    },

    /// A string could not be parsed into a [`crate::SleetId`].
    #[error("invalid sleet id {input:?}: {reason}")]
    ParseError {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is never produced.
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};

#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
