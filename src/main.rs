mod commands;

use std::path::PathBuf;

use anyhow::Result;
use agenda_core::registration::{RegistrationFilter, RegistrationStatus};
use agenda_core::store::FeedMode;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::Context;

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Calendar feeds, quick-add links and registration exports for the events site")]
struct Cli {
    /// Read events and registrations from a JSON snapshot instead of the datastore
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events with local times
    Events {
        /// upcoming, past or all
        #[arg(short, long, default_value = "upcoming")]
        mode: FeedMode,
    },
    /// Write a single event as .ics
    Ics {
        /// Event slug (or id)
        slug: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a feed of events as .ics
    Feed {
        /// upcoming, past or all
        #[arg(short, long, default_value = "upcoming")]
        mode: FeedMode,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the Google Calendar quick-add link for an event
    Google {
        /// Event slug (or id)
        slug: String,

        /// Open the link in the browser
        #[arg(long)]
        open: bool,
    },
    /// Export registrations as CSV
    Export {
        /// Only registrations for this event id
        #[arg(long)]
        event: Option<String>,

        /// registered, checked_in or cancelled
        #[arg(long)]
        status: Option<RegistrationStatus>,

        /// Match name, email or phone
        #[arg(short, long)]
        query: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Create a commented config file
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Events { mode } => {
            let ctx = Context::load(cli.data.as_deref())?;
            commands::events::run(&ctx, mode).await
        }
        Commands::Ics { slug, output } => {
            let ctx = Context::load(cli.data.as_deref())?;
            commands::ics::run_event(&ctx, &slug, output.as_deref()).await
        }
        Commands::Feed { mode, output } => {
            let ctx = Context::load(cli.data.as_deref())?;
            commands::ics::run_feed(&ctx, mode, output.as_deref()).await
        }
        Commands::Google { slug, open } => {
            let ctx = Context::load(cli.data.as_deref())?;
            commands::google::run(&ctx, &slug, open).await
        }
        Commands::Export {
            event,
            status,
            query,
            output,
        } => {
            let ctx = Context::load(cli.data.as_deref())?;
            let filter = RegistrationFilter {
                event_id: event,
                status,
                query,
            };
            commands::export::run(&ctx, &filter, output.as_deref()).await
        }
        Commands::Config { command } => match command {
            ConfigCommand::Init => commands::config::init(),
            ConfigCommand::Show => commands::config::show(),
        },
    }
}
