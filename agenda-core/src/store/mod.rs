//! Datastore access.
//!
//! Events and registrations live in a hosted database reached over its REST
//! interface. Handlers and commands talk to the `EventStore` trait so they can
//! run against `RestStore` in production and `MemoryStore` offline.

mod memory;
mod rest;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::AgendaResult;
use crate::event::EventRow;
use crate::registration::{Registration, RegistrationFilter};

pub use memory::MemoryStore;
pub use rest::RestStore;

/// Maximum number of events in one feed.
pub const FEED_LIMIT: usize = 500;

/// Which slice of events a feed covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedMode {
    /// Starting now or later, soonest first
    #[default]
    Upcoming,
    /// Started before now, latest first
    Past,
    /// Everything, latest first
    All,
}

impl FeedMode {
    /// Lenient parse for query strings: missing means upcoming, anything
    /// unrecognised means all.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("upcoming") => FeedMode::Upcoming,
            Some("past") => FeedMode::Past,
            Some(_) => FeedMode::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedMode::Upcoming => "upcoming",
            FeedMode::Past => "past",
            FeedMode::All => "all",
        }
    }

    /// Sort direction on `starts_at`.
    pub fn ascending(&self) -> bool {
        matches!(self, FeedMode::Upcoming)
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(FeedMode::Upcoming),
            "past" => Ok(FeedMode::Past),
            "all" => Ok(FeedMode::All),
            other => Err(format!("Unknown mode '{other}'. Expected upcoming, past or all")),
        }
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Look up an event by slug, then by id.
    async fn find_event(&self, key: &str) -> AgendaResult<Option<EventRow>>;

    /// Events for a feed, ordered per `mode`, at most `limit` rows.
    async fn list_events(&self, mode: FeedMode, limit: usize) -> AgendaResult<Vec<EventRow>>;

    /// Registrations newest first.
    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> AgendaResult<Vec<Registration>>;
}
