//! Decoding and encoding of temporal values stored as text.
//!
//! SQLite has no native date type; values in `DATE` / `TIMESTAMP` columns are
//! stored as text in a handful of encodings. All of them are normalized into
//! [`NaiveDateTime`] on read. Writes always use ISO-8601.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Date-time encodings accepted on read, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Date-only encoding, decoded to midnight.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Encoding used for every temporal value written by sqlgate.
const ISO_8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A stored temporal value matched none of the accepted encodings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized temporal value: '{raw}'")]
pub struct TemporalDecodeFailure {
    /// The text as stored.
    pub raw: String,
}

/// Decodes a stored temporal value into the canonical representation.
pub fn decode_temporal(raw: &str) -> Result<NaiveDateTime, TemporalDecodeFailure> {
    let text = raw.trim();

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(ts);
        }
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TemporalDecodeFailure {
            raw: raw.to_string(),
        })
}

/// Encodes a temporal value as ISO-8601 text for storage.
///
/// Fractional seconds are only written when non-zero.
pub fn encode_temporal(ts: &NaiveDateTime) -> String {
    ts.format(ISO_8601_FORMAT).to_string()
}

/// Returns true if a declared column type holds temporal values.
///
/// Matches the type names SQLite drivers report for `DATE`, `DATETIME` and
/// `TIMESTAMP` declarations.
pub fn is_temporal_type(declared: &str) -> bool {
    let base = declared
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    matches!(base.as_str(), "DATE" | "DATETIME" | "TIMESTAMP")
}
