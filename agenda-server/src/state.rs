use std::sync::Arc;

use anyhow::Result;
use agenda_core::config::AgendaConfig;
use agenda_core::ics::FeedOptions;
use agenda_core::store::EventStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    /// Site root for links and UIDs
    pub base_url: String,
    pub feed: FeedOptions,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, base_url: impl Into<String>, feed: FeedOptions) -> Self {
        AppState {
            store,
            base_url: base_url.into(),
            feed,
        }
    }

    pub fn from_config(config: &AgendaConfig) -> Result<Self> {
        let store = config.rest_store()?;
        Ok(AppState::new(
            Arc::new(store),
            config.base_url(),
            config.feed_options(),
        ))
    }
}
