pub mod config;
pub mod events;
pub mod export;
pub mod google;
pub mod ics;

use std::path::Path;

use anyhow::{Context as _, Result};
use agenda_core::config::AgendaConfig;
use agenda_core::event::CalendarEvent;
use agenda_core::store::{EventStore, MemoryStore};
use owo_colors::OwoColorize;

/// Configuration plus the store commands read from.
pub struct Context {
    pub config: AgendaConfig,
    pub store: Box<dyn EventStore>,
}

impl Context {
    /// Use the JSON snapshot at `data` if given, otherwise the configured datastore.
    pub fn load(data: Option<&Path>) -> Result<Self> {
        let config = AgendaConfig::load()?;

        let store: Box<dyn EventStore> = match data {
            Some(path) => Box::new(MemoryStore::load(path)?),
            None => Box::new(config.rest_store().context(
                "No datastore configured.\n\n\
                Set AGENDA_DATASTORE_URL and AGENDA_DATASTORE_KEY, run `agenda config init`,\n\
                or pass --data <snapshot.json>",
            )?),
        };

        Ok(Context { config, store })
    }

    pub async fn find_event(&self, key: &str) -> Result<CalendarEvent> {
        match self.store.find_event(key).await? {
            Some(row) => Ok(row.into_calendar_event()),
            None => anyhow::bail!("Event '{}' not found", key),
        }
    }
}

/// Write to `output` if given, otherwise to stdout.
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Could not write {}", path.display()))?;
            eprintln!("{} {}", "Wrote".green(), path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}
