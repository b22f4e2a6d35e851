//! In-memory store backed by a JSON snapshot.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventStore, FeedMode};
use crate::error::{AgendaError, AgendaResult};
use crate::event::EventRow;
use crate::ics::parse_timestamp;
use crate::registration::{Registration, RegistrationFilter};

/// Holds rows in memory. Loadable from a JSON file of the form
/// `{"events": [...], "registrations": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub events: Vec<EventRow>,
    #[serde(default)]
    pub registrations: Vec<Registration>,
}

impl MemoryStore {
    pub fn new(events: Vec<EventRow>) -> Self {
        MemoryStore {
            events,
            registrations: Vec::new(),
        }
    }

    pub fn with_registrations(mut self, registrations: Vec<Registration>) -> Self {
        self.registrations = registrations;
        self
    }

    pub fn load(path: &Path) -> AgendaResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AgendaError::Store(format!("Could not read {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn events_for(&self, mode: FeedMode, now: DateTime<Utc>) -> Vec<EventRow> {
        let mut dated: Vec<(Option<DateTime<Utc>>, &EventRow)> = self
            .events
            .iter()
            .map(|row| {
                let start = row
                    .starts_at
                    .as_deref()
                    .and_then(|s| parse_timestamp("starts_at", s).ok());
                (start, row)
            })
            .filter(|(start, _)| match mode {
                FeedMode::Upcoming => start.is_some_and(|s| s >= now),
                FeedMode::Past => start.is_some_and(|s| s < now),
                FeedMode::All => true,
            })
            .collect();

        if mode.ascending() {
            dated.sort_by_key(|(start, _)| *start);
        } else {
            dated.sort_by(|a, b| b.0.cmp(&a.0));
        }

        dated.into_iter().map(|(_, row)| row.clone()).collect()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn find_event(&self, key: &str) -> AgendaResult<Option<EventRow>> {
        let by_slug = self
            .events
            .iter()
            .find(|row| row.slug.as_deref() == Some(key));
        let found = by_slug.or_else(|| {
            self.events
                .iter()
                .find(|row| row.id.as_ref().is_some_and(|id| id.to_string() == key))
        });
        Ok(found.cloned())
    }

    async fn list_events(&self, mode: FeedMode, limit: usize) -> AgendaResult<Vec<EventRow>> {
        let mut rows = self.events_for(mode, Utc::now());
        rows.truncate(limit);
        Ok(rows)
    }

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> AgendaResult<Vec<Registration>> {
        let mut rows: Vec<Registration> = self
            .registrations
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
