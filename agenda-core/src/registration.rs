//! Event registrations and their CSV export.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::event::EventId;

/// Column order of the CSV export.
pub const CSV_HEADER: [&str; 6] = ["event_title", "name", "email", "phone", "status", "created_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    CheckedIn,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::CheckedIn => "checked_in",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(RegistrationStatus::Registered),
            "checked_in" => Ok(RegistrationStatus::CheckedIn),
            "cancelled" => Ok(RegistrationStatus::Cancelled),
            other => Err(format!(
                "Unknown status '{other}'. Expected registered, checked_in or cancelled"
            )),
        }
    }
}

/// The embedded `events(title)` relation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisteredEvent {
    #[serde(default)]
    pub title: Option<String>,
}

/// A `registrations` row joined with its event title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub event_id: Option<EventId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub status: RegistrationStatus,
    pub created_at: String,
    #[serde(default, rename = "events")]
    pub event: Option<RegisteredEvent>,
}

impl Registration {
    pub fn event_title(&self) -> &str {
        self.event
            .as_ref()
            .and_then(|e| e.title.as_deref())
            .unwrap_or_default()
    }

    /// Case-insensitive match on name, email or phone.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        [Some(self.name.as_str()), Some(self.email.as_str()), self.phone.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Filters for listing registrations. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationFilter {
    pub event_id: Option<String>,
    pub status: Option<RegistrationStatus>,
    pub query: Option<String>,
}

impl RegistrationFilter {
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn matches(&self, registration: &Registration) -> bool {
        if let Some(event_id) = self.event_id() {
            let matches_event = registration
                .event_id
                .as_ref()
                .is_some_and(|id| id.to_string() == event_id);
            if !matches_event {
                return false;
            }
        }
        if let Some(status) = self.status {
            if registration.status != status {
                return false;
            }
        }
        self.query().is_none_or(|q| registration.matches_query(q))
    }
}

/// Quote a CSV field when it holds a comma, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render registrations as CSV, rows separated by `\n`.
pub fn registrations_to_csv(rows: &[Registration]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for row in rows {
        let fields = [
            row.event_title(),
            row.name.as_str(),
            row.email.as_str(),
            row.phone.as_deref().unwrap_or_default(),
            row.status.as_str(),
            row.created_at.as_str(),
        ];
        lines.push(fields.map(csv_field).join(","));
    }

    lines.join("\n")
}
