//! Lenient deserializers for fields the API encodes inconsistently.

use serde::{de::Error, Deserialize, Deserializer};
use time::OffsetDateTime;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(i64),
    Text(String),
}

/// Millisecond unix timestamps arrive as strings on v2 endpoints and as numbers on v3.
pub(crate) fn option_millis<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(StringOrNumber::Number(n)) => n,
        Some(StringOrNumber::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(StringOrNumber::Text(s)) => s.trim().parse::<i64>().map_err(D::Error::custom)?,
    };

    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map(Some)
        .map_err(D::Error::custom)
}

/// User and workspace ids are numeric, everything else is a string. Normalize to strings.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => n.to_string(),
        StringOrNumber::Text(s) => s,
    })
}

pub(crate) fn option_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|raw| match raw {
            StringOrNumber::Number(n) => n.to_string(),
            StringOrNumber::Text(s) => s,
        }),
    )
}
