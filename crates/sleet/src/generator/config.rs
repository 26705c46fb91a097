use core::time::Duration;

use crate::{Error, Result, SLEET_EPOCH, SleetId};

const SLEET_EPOCH_MILLIS: u64 = SLEET_EPOCH.as_millis() as u64;

/// Immutable settings of one generator instance.
///
/// The datacenter and machine identifiers together distinguish independent
/// generators; two instances with distinct pairs never produce the same ID.
/// Assigning the pairs is left to the deployment.
///
/// # Example
///
/// ```
/// use sleet::{Error, GeneratorConfig};
///
/// let config = GeneratorConfig::new(31, 31)?;
/// assert_eq!(config.datacenter_id(), 31);
///
/// assert!(matches!(
///     GeneratorConfig::new(32, 0),
///     Err(Error::InvalidArgument { field: "datacenter_id", .. })
/// ));
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorConfig {
    datacenter_id: u64,
    machine_id: u64,
    epoch_millis: u64,
}

impl Default for GeneratorConfig {
    /// Datacenter `0`, machine `0`, anchored at [`SLEET_EPOCH`].
    fn default() -> Self {
        Self {
            datacenter_id: 0,
            machine_id: 0,
            epoch_millis: SLEET_EPOCH_MILLIS,
        }
    }
}

impl GeneratorConfig {
    /// Largest accepted datacenter identifier.
    pub const MAX_DATACENTER_ID: u64 = SleetId::DATACENTER_ID_MASK;

    /// Largest accepted machine identifier.
    pub const MAX_MACHINE_ID: u64 = SleetId::MACHINE_ID_MASK;

    /// Validates both identifiers and anchors the config at [`SLEET_EPOCH`].
    ///
    /// Inputs are signed so that values read from untyped sources (env vars,
    /// property files, JVM peers) can be rejected when negative rather than
    /// silently wrapped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either identifier is outside
    /// `[0, 31]`.
    pub fn new(datacenter_id: i64, machine_id: i64) -> Result<Self> {
        Ok(Self {
            datacenter_id: validate("datacenter_id", datacenter_id, Self::MAX_DATACENTER_ID)?,
            machine_id: validate("machine_id", machine_id, Self::MAX_MACHINE_ID)?,
            epoch_millis: SLEET_EPOCH_MILLIS,
        })
    }

    /// Anchors millisecond offsets to `epoch` (a duration since the Unix
    /// epoch) instead of [`SLEET_EPOCH`].
    ///
    /// IDs issued under different epochs are not comparable; pick one per
    /// deployment and keep it.
    ///
    /// The epoch is kept at millisecond precision. Sub-millisecond parts are
    /// dropped and anything past `u64::MAX` milliseconds saturates, which
    /// leaves a generator that only ever reports
    /// [`Error::ClockBeforeEpoch`].
    #[must_use]
    pub const fn with_epoch(mut self, epoch: Duration) -> Self {
        let millis = epoch.as_millis();
        self.epoch_millis = if millis > u64::MAX as u128 {
            u64::MAX
        } else {
            millis as u64
        };
        self
    }

    /// The datacenter identifier, `[0, 31]`.
    pub const fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    /// The machine identifier, `[0, 31]`.
    pub const fn machine_id(&self) -> u64 {
        self.machine_id
    }

    /// The epoch as a duration since the Unix epoch.
    pub const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }

    /// The epoch in milliseconds since the Unix epoch.
    pub const fn epoch_millis(&self) -> u64 {
        self.epoch_millis
    }

    /// Absolute milliseconds since the Unix epoch at which `id` was issued,
    /// assuming it came from a generator with this epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOverflow`] if the sum does not fit in a
    /// `u64`, which only happens for epochs within 2^41 ms of `u64::MAX`.
    pub fn timestamp_millis(&self, id: SleetId) -> Result<u64> {
        let millis_offset = id.millis_offset();
        match self.epoch_millis.checked_add(millis_offset) {
            Some(millis) => Ok(millis),
            None => Err(Error::TimestampOverflow {
                millis_offset,
                epoch: self.epoch_millis,
            }),
        }
    }
}

fn validate(field: &'static str, value: i64, max: u64) -> Result<u64> {
    match u64::try_from(value) {
        Ok(v) if v <= max => Ok(v),
        _ => Err(Error::InvalidArgument { field, value, max }),
    }
}
