//! Configuration, errors and logging setup shared by the maccer crates.

mod config;
mod error;
mod logging;
mod redact;

pub use config::{
    Config, DEFAULT_DATABASE_PATH, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOG_LEVEL, DEFAULT_VERIFY_POLL_INTERVAL_SECS,
    DEFAULT_VERIFY_TIMEOUT_SECS, ENV_PREFIX,
};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use redact::summarize_response_body;
