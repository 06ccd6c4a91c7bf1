//! cf-dyndns - sync a Cloudflare A-record with the current public IPv4 address.

use cf_dyndns::config::{Config, DEFAULT_CONFIG_PATH};
use cf_dyndns::{Result, SyncOutcome, Updater};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cf-dyndns")]
#[command(about = "Keep a Cloudflare DNS A-record in sync with the current public IPv4 address")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Compare only, never update the record
    #[arg(long)]
    dry_run: bool,
}

fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match run(&cli).await {
        Ok(outcome) => {
            tracing::debug!("Finished: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<SyncOutcome> {
    let config = Config::load_from(&cli.config)?;

    Updater::from_config(&config)?
        .dry_run(cli.dry_run)
        .run()
        .await
}
