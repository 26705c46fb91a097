use crate::SleetId;

/// Outcome of a non-blocking attempt to generate an ID.
///
/// Returned by [`crate::SnowflakeGenerator::try_poll_id`]:
///
/// - [`Poll::Ready`] carries a newly issued ID.
/// - [`Poll::Pending`] means all 4096 sequence values of the current
///   millisecond are used up. Nothing was mutated; retry once the clock has
///   moved past the millisecond.
///
/// # Example
///
/// ```
/// use sleet::{GeneratorConfig, Poll, SnowflakeGenerator, SystemClock};
///
/// let config = GeneratorConfig::new(1, 2)?;
/// let generator = SnowflakeGenerator::from_config(config, SystemClock);
///
/// let id = loop {
///     match generator.try_poll_id()? {
///         Poll::Ready { id } => break id,
///         Poll::Pending { .. } => std::thread::yield_now(),
///     }
/// };
/// assert_eq!(id.datacenter_id(), 1);
/// # Ok::<(), sleet::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SleetId,
    },
    /// The sequence is exhausted for the current millisecond.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}
