use serde::{Deserialize, Deserializer, de::Error};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

/// Deserializes a u64 given either as a JSON number or as a numeric string.
///
/// SEC documents are inconsistent here: `company_tickers.json` ships `cik_str`
/// as a number despite the name, other files quote it.
pub fn deserialize_lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => u64::from_str(s.trim()).map_err(Error::custom),
    }
}
