//! QueryDeck CLI - Main entry point

mod app;

use app::DeckApp;
use clap::{Parser, Subcommand};
use deck_foundation::load_config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// QueryDeck - MCP gateway to the digital workforce backend
#[derive(Parser, Debug)]
#[command(name = "querydeck")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a config file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server on stdio (default)
    Start,
    /// Check backend connectivity and cache health
    Health,
    /// Show server status
    Status {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Export call statistics to a file
    Stats {
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Startup configuration errors are fatal with a non-zero exit
    let config = load_config(args.config.as_deref())?;

    init_tracing(if args.debug {
        "debug"
    } else {
        config.log_level.as_str()
    });

    let app = DeckApp::new(config);

    match args.command {
        Some(Command::Health) => app.health().await,
        Some(Command::Status { json }) => app.status(json).await,
        Some(Command::Stats { output }) => app.export_stats(&output).await,
        Some(Command::Start) | None => app.start().await,
    }
}

/// Route logs to stderr; stdout belongs to the MCP channel
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
