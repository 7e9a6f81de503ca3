//! Serde helpers for the integer encodings found in Cosmos and Tendermint JSON.
//!
//! 64-bit integers are rendered as strings (`"12"`), older endpoints send
//! plain numbers, and absent fields mean zero.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

pub fn u64_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Unsigned(n)) => Ok(n),
        Some(Raw::Signed(n)) => u64::try_from(n).map_err(de::Error::custom),
        Some(Raw::Text(s)) if s.is_empty() => Ok(0),
        Some(Raw::Text(s)) => s.parse().map_err(de::Error::custom),
    }
}

pub fn i64_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Unsigned(n)) => i64::try_from(n).map_err(de::Error::custom),
        Some(Raw::Signed(n)) => Ok(n),
        Some(Raw::Text(s)) if s.is_empty() => Ok(0),
        Some(Raw::Text(s)) => s.parse().map_err(de::Error::custom),
    }
}

pub fn u32_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let n = u64_from_any(deserializer)?;
    u32::try_from(n).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "u64_from_any")]
        a: u64,
        #[serde(default, deserialize_with = "i64_from_any")]
        b: i64,
    }

    #[test]
    fn accepts_strings_numbers_and_nulls() {
        let p: Probe = serde_json::from_value(json!({"a": "17", "b": -3})).unwrap();
        assert_eq!((p.a, p.b), (17, -3));
        let p: Probe = serde_json::from_value(json!({"a": 4, "b": null})).unwrap();
        assert_eq!((p.a, p.b), (4, 0));
        let p: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!((p.a, p.b), (0, 0));
        assert!(serde_json::from_value::<Probe>(json!({"a": "x"})).is_err());
    }
}
