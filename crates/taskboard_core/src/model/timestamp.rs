//! ISO-8601 timestamp helpers shared by task and activity records.
//!
//! Persisted timestamps use UTC with millisecond precision and a `Z` suffix,
//! e.g. `2024-01-02T03:04:05.678Z`. Reads accept any RFC 3339 offset.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Point in time attached to tasks and activity entries.
pub type Timestamp = DateTime<Utc>;

/// Formats a timestamp in the persisted millisecond form.
pub fn format_iso_millis(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 timestamp and normalizes it to UTC.
pub fn parse_iso(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw.trim()).map(|value| value.with_timezone(&Utc))
}

/// Parses a due-date string into the instant it falls due.
///
/// Full RFC 3339 timestamps keep their time of day; plain `YYYY-MM-DD`
/// values mean midnight UTC of that day. Returns `None` for blank or
/// unrecognized input.
pub fn parse_due_date(raw: &str) -> Option<Timestamp> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_iso(trimmed).ok().or_else(|| {
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc())
    })
}

/// Serde adapter writing [`Timestamp`] values as millisecond ISO strings.
pub mod iso_millis {
    use super::{format_iso_millis, parse_iso, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_iso_millis(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_iso(&raw).map_err(|err| {
            serde::de::Error::custom(format!("invalid timestamp `{raw}`: {err}"))
        })
    }
}
