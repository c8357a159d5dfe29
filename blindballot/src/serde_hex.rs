use crate::*;
use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serializer};

// a single-purpose type for use in `#[serde(with)]`
pub enum BigUintHex {}

impl BigUintHex {
    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&integer_to_hex(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex_to_integer(&hex).map_err(de::Error::custom)
    }
}

// a single-purpose type for use in `#[serde(with)]` on optional integers
pub enum OptionBigUintHex {}

impl OptionBigUintHex {
    pub fn serialize<S: Serializer>(
        value: &Option<BigUint>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_some(&integer_to_hex(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BigUint>, D::Error> {
        let hex: Option<String> = Option::deserialize(deserializer)?;
        match hex {
            Some(hex) => hex_to_integer(&hex).map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Wire {
        #[serde(with = "BigUintHex")]
        value: BigUint,

        #[serde(with = "OptionBigUintHex", default)]
        extra: Option<BigUint>,
    }

    #[test]
    fn integers_travel_as_hex_strings() {
        let wire = Wire {
            value: BigUint::from(3233u32),
            extra: None,
        };
        let json = serde_json::to_string(&wire).unwrap();
        assert_eq!(json, r#"{"value":"ca1","extra":null}"#);

        let parsed: Wire = serde_json::from_str(r#"{"value":"CA1","extra":"11"}"#).unwrap();
        assert_eq!(parsed.value, BigUint::from(3233u32));
        assert_eq!(parsed.extra, Some(BigUint::from(17u32)));

        let missing: Wire = serde_json::from_str(r#"{"value":"1"}"#).unwrap();
        assert_eq!(missing.extra, None);
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(serde_json::from_str::<Wire>(r#"{"value":"0x11"}"#).is_err());
        assert!(serde_json::from_str::<Wire>(r#"{"value":""}"#).is_err());
        assert!(serde_json::from_str::<Wire>(r#"{"value":17}"#).is_err());
    }
}
