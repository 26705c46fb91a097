use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::SleetId;

/// Serializes as the native `u64`. Same as [`as_native`].
impl Serialize for SleetId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        as_native::serialize(self, s)
    }
}

/// Deserializes from a native `u64`. Same as [`as_native`].
impl<'de> Deserialize<'de> for SleetId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        as_native::deserialize(d)
    }
}

/// Native `u64` form, the default for [`SleetId`].
pub mod as_native {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::SleetId;

    /// Serialize an ID as its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SleetId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserialize an ID from its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The value sets the reserved sign bit
    pub fn deserialize<'de, D>(d: D) -> Result<SleetId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(d)?;
        SleetId::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Decimal string form, for consumers (JavaScript, JSON tooling) that lose
/// precision on integers above 2^53.
pub mod as_string {
    use super::{Deserialize, Deserializer, Serializer};
    use crate::SleetId;
    use std::borrow::Cow;

    /// Serialize an ID as a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SleetId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize an ID from a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not an unsigned decimal integer
    /// - The value sets the reserved sign bit
    pub fn deserialize<'de, D>(d: D) -> Result<SleetId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<'de, str>::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use crate::SleetId;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Row {
        id: SleetId,
        #[serde(with = "crate::serde::as_string")]
        public_id: SleetId,
    }

    #[test]
    fn native_and_string_forms() {
        let id = SleetId::from_components(1_000, 1, 2, 3);
        let row = Row { id, public_id: id };

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            format!(r#"{{"id":{},"public_id":"{}"}}"#, id.to_raw(), id.to_raw())
        );
        assert_eq!(serde_json::from_str::<Row>(&json).unwrap(), row);
    }

    #[test]
    fn rejects_reserved_bit() {
        let json = format!(r#"{{"id":{},"public_id":"1"}}"#, u64::MAX);
        assert!(serde_json::from_str::<Row>(&json).is_err());

        let json = format!(r#"{{"id":1,"public_id":"{}"}}"#, u64::MAX);
        assert!(serde_json::from_str::<Row>(&json).is_err());
    }

    #[test]
    fn rejects_non_numeric_string() {
        let json = r#"{"id":1,"public_id":"not-an-id"}"#;
        assert!(serde_json::from_str::<Row>(json).is_err());
    }
}
