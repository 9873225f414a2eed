//! # Observability
//!
//! Centralized tracing setup for the maccer bot.
//!
//! Components are **log producers** only. The binary calls
//! `observability::init_with_config()` once at startup and everything else
//! uses plain `tracing` macros, scoped by the spans each component is handed
//! at construction time. Nothing below this crate knows where logs end up.
//!
//! ## Modes
//!
//! - [`ObservabilityMode::Development`]: compact, human readable lines on
//!   stderr.
//! - [`ObservabilityMode::Production`]: one JSON object per line with
//!   `timestamp`, `level`, `service`, `version`, `target`, `message` and the
//!   structured `fields`. Written to stdout, or appended to `log_path` when
//!   one is configured.
//!
//! ## Usage
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "maccer".into(),
//!     default_level: "debug".into(),
//!     ..Default::default()
//! })?;
//! tracing::info!("ready");
//! ```

mod json_layer;
mod writer;

use std::io;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use json_layer::{JsonLayer, LogEntry};
pub use writer::{AppendLogWriter, AppendWriterFactory};

/// Output format selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservabilityMode {
    /// Compact human readable output on stderr.
    #[default]
    Development,
    /// Structured JSON lines.
    Production,
}

impl ObservabilityMode {
    /// Parse a mode name, falling back to development for anything unknown.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" | "json" => Self::Production,
            _ => Self::Development,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, included in every JSON line.
    pub service_name: String,

    /// Build identifier (git hash or crate version), included in every JSON line.
    pub version: String,

    /// Default level filter. `RUST_LOG` takes precedence when set.
    pub default_level: String,

    /// Output format.
    pub mode: ObservabilityMode,

    /// Optional JSONL file. Only used in production mode.
    pub log_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            version: "dev".into(),
            default_level: "info".into(),
            mode: ObservabilityMode::Development,
            log_path: None,
        }
    }
}

/// Initialize tracing with the default configuration for `service_name`.
pub fn init(service_name: &str) -> io::Result<()> {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    })
}

/// Initialize tracing with a custom configuration.
///
/// Fails only when a configured log file cannot be opened. Calling this a
/// second time is a no-op: the first installed subscriber wins.
pub fn init_with_config(config: LogConfig) -> io::Result<()> {
    let filter = build_filter(&config.default_level);

    match config.mode {
        ObservabilityMode::Development => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(io::stderr)
                .compact()
                .try_init();
        }
        ObservabilityMode::Production => match &config.log_path {
            Some(path) => {
                let factory = AppendWriterFactory::new(AppendLogWriter::open(path)?);
                let layer = JsonLayer::new(config.service_name, config.version, factory);
                let _ = tracing_subscriber::registry()
                    .with(layer.with_filter(filter))
                    .try_init();
            }
            None => {
                let layer = JsonLayer::new(config.service_name, config.version, io::stdout);
                let _ = tracing_subscriber::registry()
                    .with(layer.with_filter(filter))
                    .try_init();
            }
        },
    }

    Ok(())
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
