//! Epoch-millisecond (de)serialization for `DateTime<Utc>`.
//!
//! Snapshot documents store every timestamp as integer milliseconds since the
//! Unix epoch. Reading also accepts RFC3339 strings so hand-edited files load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Serializes `DateTime<Utc>` as epoch milliseconds.
pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(dt.timestamp_millis())
}

/// Deserializes `DateTime<Utc>` from epoch milliseconds or an RFC3339 string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match MillisOrString::deserialize(deserializer)? {
        MillisOrString::Millis(ms) => {
            from_millis(ms).ok_or_else(|| Error::custom(format!("timestamp out of range: {ms}")))
        }
        MillisOrString::Float(ms) => {
            // Some writers emit `1704110400000.0`.
            #[allow(clippy::cast_possible_truncation)]
            let ms = ms as i64;
            from_millis(ms).ok_or_else(|| Error::custom(format!("timestamp out of range: {ms}")))
        }
        MillisOrString::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::custom(format!("Invalid RFC3339 timestamp: {e}"))),
    }
}

/// `Option<DateTime<Utc>>` helpers; `null` and absence both map to `None`.
pub mod option {
    use super::{from_millis, DateTime, Deserialize, Deserializer, MillisOrString, Serializer, Utc};

    /// Serializes `Option<DateTime<Utc>>` as epoch milliseconds or `null`.
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&dt.timestamp_millis()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes `Option<DateTime<Utc>>` from epoch milliseconds, RFC3339 or `null`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        match Option::<MillisOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(MillisOrString::Millis(ms)) => from_millis(ms)
                .map(Some)
                .ok_or_else(|| Error::custom(format!("timestamp out of range: {ms}"))),
            Some(MillisOrString::Float(ms)) => {
                #[allow(clippy::cast_possible_truncation)]
                let ms = ms as i64;
                from_millis(ms)
                    .map(Some)
                    .ok_or_else(|| Error::custom(format!("timestamp out of range: {ms}")))
            }
            Some(MillisOrString::String(s)) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| Error::custom(format!("Invalid RFC3339 timestamp: {e}"))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MillisOrString {
    Millis(i64),
    Float(f64),
    String(String),
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}
