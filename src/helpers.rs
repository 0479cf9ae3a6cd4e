use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::from_value;

// Attempt to deserialize the value; if the value is null or an error occurs, return None.
// This is useful when deserializing fields that may mean different things in different
// contexts, and where we would rather ignore the result than fail to deserialize. For example,
// the fields in JWKs are not well defined; extensions could theoretically define their own
// field names that overload field names used by other JWK types.
pub(crate) fn deserialize_option_or_none<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::de::DeserializeOwned,
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match from_value::<Option<T>>(value) {
        Ok(val) => Ok(val),
        Err(_) => Ok(None),
    }
}

// The JWT spec is ambiguous about whether seconds should be expressed as integers, or whether
// floating-point values are allowed. Both are accepted here, keeping any fractional part.
pub(crate) fn timestamp_to_utc(seconds: &serde_json::Number) -> Option<DateTime<Utc>> {
    let (secs, nsecs) = if let Some(secs) = seconds.as_i64() {
        (secs, 0u32)
    } else {
        let secs_f64 = seconds.as_f64()?;
        if !secs_f64.is_finite() {
            return None;
        }
        let secs = secs_f64.floor();
        (
            secs as i64,
            ((secs_f64 - secs) * 1_000_000_000.).floor() as u32,
        )
    };
    Utc.timestamp_opt(secs, nsecs).single()
}
