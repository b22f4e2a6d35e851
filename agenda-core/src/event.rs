//! Event records.
//!
//! `EventRow` is what the datastore hands back; `CalendarEvent` is the
//! narrowed view the feed builders work on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lookup::{first_present, non_blank};

/// Title used when an event has none.
pub const DEFAULT_TITLE: &str = "Event";

/// Identifier used when an event has neither id nor slug.
pub const FALLBACK_IDENTIFIER: &str = "event";

/// Event identifier as stored: numeric primary keys and UUID/text keys both occur.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{n}"),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EventId {
    fn from(n: i64) -> Self {
        EventId::Number(n)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        EventId::Text(s.to_string())
    }
}

/// An event as consumed by the calendar builders.
///
/// Timestamps stay as the raw strings the datastore returned; the builders
/// parse them and reject malformed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: Option<EventId>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    pub starts_at: String,
    #[serde(default)]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CalendarEvent {
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        starts_at: impl Into<String>,
    ) -> Self {
        CalendarEvent {
            id: None,
            slug: slug.into(),
            title: title.into(),
            starts_at: starts_at.into(),
            ends_at: None,
            location: None,
            description: None,
        }
    }

    /// Identifier used to build the UID: `id`, then `slug`.
    pub fn identifier(&self) -> String {
        let id = self.id.as_ref().map(ToString::to_string);
        first_present([id.as_deref(), Some(self.slug.as_str())])
            .unwrap_or(FALLBACK_IDENTIFIER)
            .to_string()
    }

    /// Stem for download filenames: `slug`, then `id`.
    pub fn file_stem(&self) -> String {
        let id = self.id.as_ref().map(ToString::to_string);
        first_present([Some(self.slug.as_str()), id.as_deref()])
            .unwrap_or(FALLBACK_IDENTIFIER)
            .to_string()
    }

    pub fn display_title(&self) -> &str {
        non_blank(Some(&self.title)).unwrap_or(DEFAULT_TITLE)
    }

    pub fn ends_at(&self) -> Option<&str> {
        non_blank(self.ends_at.as_deref())
    }

    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    /// Canonical detail page URL: `<base_url>/events/<slug>`.
    ///
    /// A blank slug falls back to the filename stem so the path never ends in `/events/`.
    pub fn detail_url(&self, base_url: &str) -> String {
        let base = base_url.strip_suffix('/').unwrap_or(base_url);
        format!("{}/events/{}", base, self.file_stem())
    }
}

/// An `events` row as returned by the datastore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    #[serde(default)]
    pub id: Option<EventId>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl EventRow {
    /// Columns selected for calendar output.
    pub const COLUMNS: &'static str =
        "id,slug,title,starts_at,ends_at,location,location_name,address,description";

    /// Location resolved as `location`, then `location_name`, then `address`.
    pub fn resolved_location(&self) -> Option<&str> {
        first_present([
            self.location.as_deref(),
            self.location_name.as_deref(),
            self.address.as_deref(),
        ])
    }

    pub fn into_calendar_event(self) -> CalendarEvent {
        let location = self.resolved_location().map(str::to_string);
        CalendarEvent {
            id: self.id,
            slug: self.slug.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            starts_at: self.starts_at.unwrap_or_default(),
            ends_at: self.ends_at,
            location,
            description: self.description,
        }
    }
}

impl From<EventRow> for CalendarEvent {
    fn from(row: EventRow) -> Self {
        row.into_calendar_event()
    }
}
