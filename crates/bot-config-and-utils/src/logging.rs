//! Logging initialization for the bot.
//!
//! Thin wrapper over the observability crate that maps the bot's
//! environment onto a [`LogConfig`].

use observability::{LogConfig, ObservabilityMode};
use std::path::PathBuf;

/// Initialize the logging system for the bot.
///
/// - `MACCER_OBS_MODE=prod` switches to JSON lines
/// - `MACCER_LOG_FILE` appends those lines to a file instead of stdout
/// - `GIT_HASH` is stamped into every JSON line as the version
/// - `RUST_LOG` overrides `level`
///
/// ```ignore
/// init_logging("info")?;
/// tracing::info!("bot started");
/// ```
pub fn init_logging(level: &str) -> std::io::Result<()> {
    let mode = std::env::var("MACCER_OBS_MODE")
        .map(|v| ObservabilityMode::from_name(&v))
        .unwrap_or_default();

    let version = std::env::var("GIT_HASH")
        .ok()
        .and_then(non_empty_env)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    let log_path = std::env::var("MACCER_LOG_FILE")
        .ok()
        .and_then(non_empty_env)
        .map(PathBuf::from);

    observability::init_with_config(LogConfig {
        service_name: "maccer".into(),
        version,
        default_level: level.into(),
        mode,
        log_path,
    })
}

fn non_empty_env(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
