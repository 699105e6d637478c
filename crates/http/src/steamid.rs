//! Accepts a 64-bit Steam ID as either a JSON number or a JSON string:
//! clients whose numeric type is 53-bit (JavaScript) need the string
//! form to avoid precision loss.

use serde::{Deserialize, Deserializer};

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrU64 {
        String(String),
        U64(u64),
    }

    match StringOrU64::deserialize(deserializer)? {
        StringOrU64::U64(value) => Ok(value),
        StringOrU64::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "deserialize")]
        steam_id: u64,
    }

    #[test]
    fn accepts_json_number() {
        let parsed: Wrapper = serde_json::from_str(r#"{"steam_id": 76561198012345678}"#).unwrap();
        assert_eq!(parsed.steam_id, 76561198012345678);
    }

    #[test]
    fn accepts_json_string() {
        let parsed: Wrapper = serde_json::from_str(r#"{"steam_id": "76561198012345678"}"#).unwrap();
        assert_eq!(parsed.steam_id, 76561198012345678);
    }

    #[test]
    fn rejects_non_numeric_string() {
        let result: Result<Wrapper, _> = serde_json::from_str(r#"{"steam_id": "not-a-number"}"#);
        assert!(result.is_err());
    }
}
