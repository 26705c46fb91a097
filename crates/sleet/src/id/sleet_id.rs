use core::{fmt, str::FromStr};

use crate::{Error, Result, id::layout::write_bit_layout_debug};

/// A 63-bit Snowflake ID packed into a `u64`.
///
/// - 1 bit reserved (always zero, so the value fits a signed 64-bit integer)
/// - 41 bits millisecond offset since the generator's epoch
/// - 5 bits datacenter ID
/// - 5 bits machine ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21               17 16            12 11             0
///              +--------------+----------------+-------------------+----------------+---------------+
///  Field:      | reserved (1) | millis (41)    | datacenter ID (5) | machine ID (5) | sequence (12) |
///              +--------------+----------------+-------------------+----------------+---------------+
///              |<----------------------- MSB ---------- 64 bits --------- LSB ----------------------->|
/// ```
///
/// The layout is a fixed external contract: previously issued IDs must stay
/// decodable, so widths and order never change.
///
/// # Example
///
/// ```
/// use sleet::SleetId;
///
/// let id = SleetId::from_components(1000, 3, 7, 42);
/// let parts = id.decode();
/// assert_eq!(parts.millis_offset, 1000);
/// assert_eq!(parts.datacenter_id, 3);
/// assert_eq!(parts.machine_id, 7);
/// assert_eq!(parts.sequence, 42);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SleetId {
    id: u64,
}

/// The four fields of a [`SleetId`], as produced by [`SleetId::decode`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Components {
    /// Milliseconds elapsed between the epoch and the issuing millisecond.
    pub millis_offset: u64,
    /// Datacenter identifier, `[0, 31]`.
    pub datacenter_id: u64,
    /// Machine identifier, `[0, 31]`.
    pub machine_id: u64,
    /// Per-millisecond counter, `[0, 4095]`.
    pub sequence: u64,
}

impl Components {
    /// Packs these fields into a [`SleetId`].
    pub const fn encode(&self) -> SleetId {
        SleetId::from_components(
            self.millis_offset,
            self.datacenter_id,
            self.machine_id,
            self.sequence,
        )
    }
}

impl SleetId {
    /// Width of the millisecond offset field.
    pub const MILLIS_BITS: u32 = 41;
    /// Width of the datacenter ID field.
    pub const DATACENTER_ID_BITS: u32 = 5;
    /// Width of the machine ID field.
    pub const MACHINE_ID_BITS: u32 = 5;
    /// Width of the sequence field.
    pub const SEQUENCE_BITS: u32 = 12;

    /// Bitmask for the 41-bit millisecond offset. Occupies bits 22 through 62.
    pub const MILLIS_MASK: u64 = (1 << Self::MILLIS_BITS) - 1;

    /// Bitmask for the 5-bit datacenter ID. Occupies bits 17 through 21.
    pub const DATACENTER_ID_MASK: u64 = (1 << Self::DATACENTER_ID_BITS) - 1;

    /// Bitmask for the 5-bit machine ID. Occupies bits 12 through 16.
    pub const MACHINE_ID_MASK: u64 = (1 << Self::MACHINE_ID_BITS) - 1;

    /// Bitmask for the 12-bit sequence. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// The sign bit. Never set in a generated ID.
    pub const RESERVED_MASK: u64 = 1 << 63;

    /// Shift of the millisecond offset (5 + 5 + 12).
    pub const MILLIS_SHIFT: u32 =
        Self::DATACENTER_ID_BITS + Self::MACHINE_ID_BITS + Self::SEQUENCE_BITS;

    /// Shift of the datacenter ID (5 + 12).
    pub const DATACENTER_ID_SHIFT: u32 = Self::MACHINE_ID_BITS + Self::SEQUENCE_BITS;

    /// Shift of the machine ID.
    pub const MACHINE_ID_SHIFT: u32 = Self::SEQUENCE_BITS;

    /// Shift of the sequence.
    pub const SEQUENCE_SHIFT: u32 = 0;

    /// Packs the four fields into an ID.
    ///
    /// Each field is masked to its width first. An offset past 41 bits
    /// (roughly 69 years after the epoch) therefore wraps instead of spilling
    /// into the reserved bit.
    pub const fn from_components(
        millis_offset: u64,
        datacenter_id: u64,
        machine_id: u64,
        sequence: u64,
    ) -> Self {
        let millis = (millis_offset & Self::MILLIS_MASK) << Self::MILLIS_SHIFT;
        let datacenter_id = (datacenter_id & Self::DATACENTER_ID_MASK) << Self::DATACENTER_ID_SHIFT;
        let machine_id = (machine_id & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: millis | datacenter_id | machine_id | sequence,
        }
    }

    /// Extracts the millisecond offset since the epoch.
    pub const fn millis_offset(&self) -> u64 {
        (self.id >> Self::MILLIS_SHIFT) & Self::MILLIS_MASK
    }

    /// Extracts the datacenter ID.
    pub const fn datacenter_id(&self) -> u64 {
        (self.id >> Self::DATACENTER_ID_SHIFT) & Self::DATACENTER_ID_MASK
    }

    /// Extracts the machine ID.
    pub const fn machine_id(&self) -> u64 {
        (self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK
    }

    /// Extracts the sequence number.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Splits the ID into its four fields.
    pub const fn decode(&self) -> Components {
        Components {
            millis_offset: self.millis_offset(),
            datacenter_id: self.datacenter_id(),
            machine_id: self.machine_id(),
            sequence: self.sequence(),
        }
    }

    /// Returns the raw packed value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Wraps a raw packed value without validation.
    ///
    /// Use [`Self::is_valid`] to check that the reserved bit is clear.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the ID as a signed 64-bit integer, for consumers that store
    /// IDs in `BIGINT` columns or JVM `long`s.
    ///
    /// Lossless for every valid ID since the reserved bit is clear.
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }

    /// Returns `true` if the reserved sign bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id & Self::RESERVED_MASK == 0
    }

    /// Returns the ID as a zero-padded 19-digit string, so that lexical order
    /// matches numeric order.
    pub fn to_padded_string(&self) -> String {
        format!("{:019}", self.id)
    }
}

impl From<Components> for SleetId {
    fn from(components: Components) -> Self {
        components.encode()
    }
}

impl From<SleetId> for Components {
    fn from(id: SleetId) -> Self {
        id.decode()
    }
}

impl From<SleetId> for u64 {
    fn from(id: SleetId) -> Self {
        id.to_raw()
    }
}

impl TryFrom<u64> for SleetId {
    type Error = Error;

    fn try_from(raw: u64) -> Result<Self> {
        let id = Self::from_raw(raw);
        if !id.is_valid() {
            return Err(Error::ParseError {
                input: raw.to_string(),
                reason: "reserved sign bit is set",
            });
        }
        Ok(id)
    }
}

impl TryFrom<i64> for SleetId {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        if raw < 0 {
            return Err(Error::ParseError {
                input: raw.to_string(),
                reason: "negative values are never issued",
            });
        }
        Ok(Self::from_raw(raw as u64))
    }
}

impl FromStr for SleetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim().parse::<u64>().map_err(|_| Error::ParseError {
            input: s.to_owned(),
            reason: "not an unsigned decimal integer",
        })?;
        Self::try_from(raw).map_err(|_| Error::ParseError {
            input: s.to_owned(),
            reason: "reserved sign bit is set",
        })
    }
}

impl fmt::Display for SleetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SleetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bit_layout_debug(f, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_fields_at_fixed_offsets() {
        let id = SleetId::from_components(1, 1, 1, 1);
        assert_eq!(id.to_raw(), (1 << 22) | (1 << 17) | (1 << 12) | 1);
    }

    #[test]
    fn matches_reference_packing() {
        // offset << 22 | datacenter << 17 | machine << 12 | sequence
        let offset = 123_456_789u64;
        let expected = (offset << 22) | (17 << 17) | (29 << 12) | 4000;
        let id = SleetId::from_components(offset, 17, 29, 4000);
        assert_eq!(id.to_raw(), expected);
        assert_eq!(
            id.decode(),
            Components {
                millis_offset: offset,
                datacenter_id: 17,
                machine_id: 29,
                sequence: 4000,
            }
        );
    }

    #[test]
    fn max_fields_fill_63_bits() {
        let id = SleetId::from_components(
            SleetId::MILLIS_MASK,
            SleetId::DATACENTER_ID_MASK,
            SleetId::MACHINE_ID_MASK,
            SleetId::SEQUENCE_MASK,
        );
        assert_eq!(id.to_raw(), i64::MAX as u64);
        assert!(id.is_valid());
        assert_eq!(id.to_i64(), i64::MAX);
    }

    #[test]
    fn fields_do_not_bleed_into_neighbours() {
        let id = SleetId::from_components(0, SleetId::DATACENTER_ID_MASK, 0, 0);
        assert_eq!(id.millis_offset(), 0);
        assert_eq!(id.machine_id(), 0);
        assert_eq!(id.sequence(), 0);
        assert_eq!(id.datacenter_id(), 31);

        let id = SleetId::from_components(0, 0, SleetId::MACHINE_ID_MASK, 0);
        assert_eq!(id.datacenter_id(), 0);
        assert_eq!(id.machine_id(), 31);
    }

    #[test]
    fn oversized_offset_wraps_without_touching_sign_bit() {
        let id = SleetId::from_components(SleetId::MILLIS_MASK + 5, 0, 0, 0);
        assert!(id.is_valid());
        assert_eq!(id.millis_offset(), 4);
    }

    #[test]
    fn orders_by_time_then_node_then_sequence() {
        let a = SleetId::from_components(10, 31, 31, 4095);
        let b = SleetId::from_components(11, 0, 0, 0);
        assert!(a < b);
        let c = SleetId::from_components(11, 0, 0, 1);
        assert!(b < c);
    }

    #[test]
    fn parses_decimal_strings() {
        let id = SleetId::from_components(42, 1, 2, 3);
        let parsed: SleetId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        let padded: SleetId = id.to_padded_string().parse().unwrap();
        assert_eq!(padded, id);
        assert_eq!(id.to_padded_string().len(), 19);
    }

    #[test]
    fn rejects_invalid_strings() {
        assert!(matches!(
            "abc".parse::<SleetId>(),
            Err(Error::ParseError { .. })
        ));
        assert!(matches!(
            "-1".parse::<SleetId>(),
            Err(Error::ParseError { .. })
        ));
        assert!(matches!(
            u64::MAX.to_string().parse::<SleetId>(),
            Err(Error::ParseError {
                reason: "reserved sign bit is set",
                ..
            })
        ));
    }

    #[test]
    fn signed_conversion_rejects_negatives() {
        assert!(SleetId::try_from(-5i64).is_err());
        let id = SleetId::try_from(1i64 << 22).unwrap();
        assert_eq!(id.millis_offset(), 1);
    }

    #[test]
    fn debug_renders_layout_table() {
        let id = SleetId::from_components(5, 2, 3, 4);
        let out = format!("{id:?}");
        assert!(out.starts_with("SleetId {"));
        assert!(out.contains("millis (41)"));
        assert!(out.contains("datacenter_id (5)"));
        assert!(out.contains("machine_id (5)"));
        assert!(out.contains("sequence (12)"));
        assert!(out.contains("0x5"));
    }
}
