//! Structured logging setup.
//!
//! Subscriber initialization with an env-filter level and a choice of json
//! or plain text output. Human-readable status lines for scan outcomes go
//! to stdout separately (see the pipeline module); this is the structured
//! side.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    Init(String),
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. "info" or "tweetmirror=debug".
    pub level: String,
    /// Emit JSON lines instead of human-formatted output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| LoggingError::Init(e.to_string()))
}
