//! Maccer - chat bot that links chat accounts to forum accounts.

mod app;
mod commands;

use std::path::PathBuf;

use bot_config_and_utils::{init_logging, Config};
use clap::Parser;

/// Maccer command-line interface.
#[derive(Parser)]
#[command(name = "maccer")]
#[command(about = "Chat bot that verifies forum account ownership")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). Overrides MACCER_LOG_LEVEL.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Environment file loaded before reading configuration
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A missing env file is fine; the variables may come from the process.
    let env_loaded = dotenvy::from_path(&cli.env_file).is_ok();

    let config = Config::from_env()?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level)?;

    if !env_loaded {
        tracing::debug!(path = %cli.env_file.display(), "No env file loaded");
    }

    app::run_bot(config).await
}
