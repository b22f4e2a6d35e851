use anyhow::Result;
use agenda_core::config::AgendaConfig;
use owo_colors::OwoColorize;

/// Create ~/.config/agenda/config.toml if it does not exist yet.
pub fn init() -> Result<()> {
    let path = AgendaConfig::config_path()?;

    if path.exists() {
        println!("{} {}", "Config already exists at".dimmed(), path.display());
        return Ok(());
    }

    AgendaConfig::create_default_config(&path)?;
    println!("{} {}", "Created".green(), path.display());

    Ok(())
}

/// Print the merged file + environment configuration, key redacted.
pub fn show() -> Result<()> {
    let mut config = AgendaConfig::load()?;
    if config.datastore_key.is_some() {
        config.datastore_key = Some("<redacted>".to_string());
    }

    print!("{}", toml::to_string_pretty(&config)?);
    println!("{} {}", "# site root:".dimmed(), config.base_url().dimmed());

    Ok(())
}
