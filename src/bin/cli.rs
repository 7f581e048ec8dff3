//! Listing watch CLI
//!
//! Local execution entry point. For AWS Lambda, use `listing-watch-lambda`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use listing_watch::{
    error::{AppError, Result},
    models::Config,
    pipeline::{Monitor, RunStatus},
    storage::{LocalStore, StateStore},
};

/// Watch Binance new-listing announcements and alert a Slack webhook
#[derive(Parser, Debug)]
#[command(name = "listing-watch", version, about)]
struct Cli {
    /// Optional TOML config; environment variables override it
    #[arg(short, long, default_value = "listing-watch.toml")]
    config: PathBuf,

    /// Directory used as the local bucket root
    #[arg(short, long, default_value = "state")]
    state_dir: PathBuf,

    /// Keep state in S3 instead of the local directory
    #[cfg(feature = "s3")]
    #[arg(long)]
    s3: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one invocation: fetch, alert new listings, persist
    Run,

    /// Show what would be alerted without sending or writing
    Check,

    /// Print the known identifiers
    State,

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load the TOML file when present, then apply environment overrides.
fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        log::debug!("No config file at {}, using defaults", path.display());
        Config::default()
    };
    config.apply_vars(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

async fn open_store(cli: &Cli, config: &Config) -> Arc<dyn StateStore> {
    #[cfg(feature = "s3")]
    if cli.s3 {
        let store = listing_watch::storage::S3Store::from_config(&config.storage).await;
        return Arc::new(store);
    }

    Arc::new(LocalStore::new(
        &cli.state_dir,
        &config.storage.bucket,
        &config.storage.object_key,
    ))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
    };

    let store = open_store(&cli, &config).await;
    log::info!("Known ids stored at {}", store.location());

    match cli.command {
        Command::Run => {
            let monitor = Monitor::from_config(&config, store)?;
            let report = monitor.run().await?;
            report.log_summary();

            if report.status == RunStatus::CompletedWithNotifyFailures {
                return Err(AppError::notify(
                    report.failed.join(", "),
                    "completed with partial notification failure",
                ));
            }
        }

        Command::Check => {
            let monitor = Monitor::from_config(&config, store)?;
            let preview = monitor.check().await?;

            log::info!(
                "{} parsed, {} known, {} would be alerted",
                preview.parsed,
                preview.known_total,
                preview.new_items.len()
            );
            for item in &preview.new_items {
                log::info!("    {} | {} | {}", item.published_display(), item.title, item.link);
            }
        }

        Command::State => {
            let ids = store.load().await?;
            log::info!("{} known ids", ids.len());
            for id in ids {
                println!("{id}");
            }
        }

        Command::Validate => {
            log::info!("✓ Config OK");
            log::info!("    source: {}", config.source.url);
            log::info!("    bucket: {}", config.storage.bucket);
            log::info!("    key: {}", config.storage.object_key);
        }
    }

    Ok(())
}
