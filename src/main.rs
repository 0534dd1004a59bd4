// longread: a terminal reader for long-form Nostr articles.
// Parses the command line, sets up logging and config, then runs the TUI.

mod app;
mod config;
mod error;
mod event;
mod loader;
mod logging;
mod nostr;
mod state;
mod tui;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::app::App;
use crate::config::{AppConfig, FetchStrategy, Overrides};
use crate::loader::{CacheQuery, DataLoader};
use crate::nostr::CacheClient;

#[derive(Parser, Debug)]
#[command(name = "longread", version, about = "Read long-form Nostr articles in the terminal")]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache server base URL
    #[arg(long)]
    server: Option<String>,

    /// Cache id for the cache_id strategy
    #[arg(long)]
    cache_id: Option<String>,

    /// Which cache endpoint to query
    #[arg(long, value_enum)]
    strategy: Option<FetchStrategy>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = match config::log_dir() {
        Some(dir) => match logging::init(&dir, &cli.log_level) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("warning: logging disabled: {}", e);
                None
            }
        },
        None => None,
    };

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    }
    .with_overrides(Overrides {
        server: cli.server,
        cache_id: cli.cache_id,
        strategy: cli.strategy,
    });
    config.validate()?;

    let client = CacheClient::new(&config.server)?;
    let loader = DataLoader::new(
        CacheQuery::new(client.clone(), config.cache_request()),
        config.retry_policy(),
    );
    info!(
        server = client.server(),
        strategy = ?config.strategy,
        retries = loader.policy().retries,
        "starting longread"
    );

    let mut terminal = tui::init()?;

    // Install a panic hook that restores the terminal before printing the panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = tui::restore();
        default_panic(info);
    }));

    let result = App::new(config.placeholder_avatar.clone())
        .run(&mut terminal, loader)
        .await;
    tui::restore()?;

    result?;
    Ok(())
}
