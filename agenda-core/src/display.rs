//! Human-facing date formatting.
//!
//! Listings show times in the site's local zone with Indonesian day and month
//! names. This is kept apart from the iCalendar path, which is always UTC.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{AgendaError, AgendaResult};
use crate::ics::parse_timestamp;

pub const DEFAULT_DISPLAY_TIMEZONE: &str = "Asia/Jakarta";

const WEEKDAYS: [&str; 7] = ["Sen", "Sel", "Rab", "Kam", "Jum", "Sab", "Min"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

#[derive(Debug, Clone, Copy)]
pub struct DisplayFormatter {
    tz: Tz,
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        DisplayFormatter {
            tz: chrono_tz::Asia::Jakarta,
        }
    }
}

impl DisplayFormatter {
    pub fn new(tz_name: &str) -> AgendaResult<Self> {
        let tz = tz_name
            .parse::<Tz>()
            .map_err(|e| AgendaError::Config(format!("Unknown timezone '{tz_name}': {e}")))?;
        Ok(DisplayFormatter { tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// e.g. `Sab, 01 Mar 2025 17.00 WIB`
    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        let local = instant.with_timezone(&self.tz);
        format!(
            "{}, {:02} {} {} {:02}.{:02} {}",
            WEEKDAYS[local.weekday().num_days_from_monday() as usize],
            local.day(),
            MONTHS[local.month0() as usize],
            local.year(),
            local.hour(),
            local.minute(),
            local.format("%Z"),
        )
    }

    /// Format a stored timestamp string.
    pub fn format_raw(&self, field: &'static str, value: &str) -> AgendaResult<String> {
        parse_timestamp(field, value).map(|dt| self.format(&dt))
    }

    /// Day-of-month and upper-case month, as shown on listing badges.
    pub fn badge(&self, instant: &DateTime<Utc>) -> (String, String) {
        let local = instant.with_timezone(&self.tz);
        (
            format!("{:02}", local.day()),
            MONTHS[local.month0() as usize].to_uppercase(),
        )
    }
}
