//! Agenda configuration.
//!
//! Read from `~/.config/agenda/config.toml`, overlaid by `AGENDA_*`
//! environment variables (`AGENDA_SITE_URL`, `AGENDA_DATASTORE_KEY`, ...).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::display::{DEFAULT_DISPLAY_TIMEZONE, DisplayFormatter};
use crate::error::{AgendaError, AgendaResult};
use crate::ics::FeedOptions;
use crate::store::RestStore;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

fn default_display_timezone() -> String {
    DEFAULT_DISPLAY_TIMEZONE.to_string()
}

fn default_product_id() -> String {
    FeedOptions::default().product_id
}

fn default_calendar_name() -> String {
    FeedOptions::default().calendar_name
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Public site root used in links and UIDs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,

    /// Hosted datastore project URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore_url: Option<String>,

    /// Datastore API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore_key: Option<String>,

    /// IANA zone for human-facing dates (never used in feeds)
    #[serde(default = "default_display_timezone")]
    pub display_timezone: String,

    #[serde(default = "default_product_id")]
    pub product_id: String,

    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    /// Server bind address
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        AgendaConfig {
            site_url: None,
            datastore_url: None,
            datastore_key: None,
            display_timezone: default_display_timezone(),
            product_id: default_product_id(),
            calendar_name: default_calendar_name(),
            listen: default_listen(),
        }
    }
}

impl AgendaConfig {
    pub fn config_path() -> AgendaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default path and the environment.
    pub fn load() -> AgendaResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path` (optional) and the environment.
    pub fn load_from(path: &Path) -> AgendaResult<Self> {
        ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::with_prefix("AGENDA"))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| AgendaError::Config(e.to_string()))
    }

    /// Site root: `site_url`, else `https://$VERCEL_URL`, else localhost.
    pub fn base_url(&self) -> String {
        let vercel_url = std::env::var("VERCEL_URL").ok();
        resolve_base_url(self.site_url.as_deref(), vercel_url.as_deref())
    }

    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            product_id: self.product_id.clone(),
            calendar_name: self.calendar_name.clone(),
        }
    }

    pub fn display(&self) -> AgendaResult<DisplayFormatter> {
        DisplayFormatter::new(&self.display_timezone)
    }

    pub fn rest_store(&self) -> AgendaResult<RestStore> {
        let url = self.datastore_url.as_deref().ok_or_else(|| {
            AgendaError::Config("datastore_url is not set (AGENDA_DATASTORE_URL)".into())
        })?;
        let key = self.datastore_key.as_deref().ok_or_else(|| {
            AgendaError::Config("datastore_key is not set (AGENDA_DATASTORE_KEY)".into())
        })?;
        RestStore::new(url, key)
    }

    /// Create a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> AgendaResult<()> {
        let contents = format!(
            "\
# agenda configuration

# Public site root, used for event links and calendar UIDs:
# site_url = \"https://agenda.example.org\"

# Hosted datastore:
# datastore_url = \"https://project.example.co\"
# datastore_key = \"anon-key\"

# Timezone for dates shown to people (feeds are always UTC):
# display_timezone = \"{DEFAULT_DISPLAY_TIMEZONE}\"

# Feed metadata:
# product_id = \"{}\"
# calendar_name = \"{}\"

# Server bind address:
# listen = \"{DEFAULT_LISTEN}\"
",
            default_product_id(),
            default_calendar_name(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn resolve_base_url(site_url: Option<&str>, vercel_url: Option<&str>) -> String {
    if let Some(site_url) = non_empty(site_url) {
        return site_url.to_string();
    }
    if let Some(host) = non_empty(vercel_url) {
        return format!("https://{host}");
    }
    DEFAULT_BASE_URL.to_string()
}
