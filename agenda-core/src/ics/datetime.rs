//! Timestamp parsing and the iCalendar UTC wire format.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{AgendaError, AgendaResult};

/// UTC basic format: `YYYYMMDDTHHMMSSZ`.
pub const ICS_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Datastore style with a space separator and a short offset (`2025-03-01 10:00:00+00`).
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Offset-less timestamps are read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a stored timestamp into an instant.
///
/// `field` names the input in the error so callers can tell `starts_at`
/// from `ends_at`.
pub fn parse_timestamp(field: &'static str, value: &str) -> AgendaResult<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt.and_utc());
        }
    }

    Err(AgendaError::InvalidTimestamp {
        field,
        value: value.to_string(),
    })
}

pub fn format_utc(instant: &DateTime<Utc>) -> String {
    instant.format(ICS_UTC_FORMAT).to_string()
}

/// Parse and re-emit a stored timestamp in the iCalendar UTC format.
pub fn to_ics_utc(field: &'static str, value: &str) -> AgendaResult<String> {
    parse_timestamp(field, value).map(|dt| format_utc(&dt))
}
