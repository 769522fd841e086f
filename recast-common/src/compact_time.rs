//! Compact broadcast timestamp handling
//!
//! Broadcast schedules carry start times as 14-digit local timestamps
//! (`YYYYMMDDHHmmss`), second precision, no timezone marker. All schedule
//! math downstream works on the parsed `NaiveDateTime`.

use chrono::NaiveDateTime;
use thiserror::Error;

const COMPACT_FORMAT: &str = "%Y%m%d%H%M%S";

/// Errors from compact timestamp parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompactTimeError {
    #[error("expected 14 digits, got {0} characters")]
    InvalidLength(usize),

    #[error("unparseable timestamp {0:?}")]
    Unparseable(String),
}

/// Parse a 14-digit `YYYYMMDDHHmmss` string into a local naive timestamp.
///
/// The string must be exactly 14 ASCII digits and denote a valid calendar
/// date and time of day.
pub fn parse_compact(s: &str) -> Result<NaiveDateTime, CompactTimeError> {
    if s.len() != 14 {
        return Err(CompactTimeError::InvalidLength(s.len()));
    }
    NaiveDateTime::parse_from_str(s, COMPACT_FORMAT)
        .map_err(|_| CompactTimeError::Unparseable(s.to_string()))
}

/// Format a timestamp back into the compact schedule form.
pub fn format_compact(ts: NaiveDateTime) -> String {
    ts.format(COMPACT_FORMAT).to_string()
}
