//! Runtime configuration: credentials from the environment, watchlists from
//! plain text files.

pub mod watchlist;

pub use watchlist::Watchlists;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which media kinds get mirrored. Historical deployments differed on video
/// support, so each kind is a flag rather than a hard-coded choice.
#[derive(Debug, Clone, Copy)]
pub struct MirrorFlags {
    pub photos: bool,
    pub videos: bool,
    pub animated: bool,
}

impl Default for MirrorFlags {
    fn default() -> Self {
        Self {
            photos: true,
            videos: true,
            animated: true,
        }
    }
}

/// All settings the bot needs, read once at startup. Watchlists are not
/// here: they reload every scan cycle.
#[derive(Debug, Clone)]
pub struct Settings {
    pub reddit_access_token: String,
    pub reddit_user_agent: String,
    pub reddit_username: String,
    pub twitter_bearer_token: String,
    pub imgur_client_id: String,
    pub streamable_username: String,
    pub streamable_password: String,
    pub redis_url: String,
    pub poll_interval_secs: u64,
    pub flags: MirrorFlags,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { name, value }),
        },
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let poll_raw =
            std::env::var("POLL_INTERVAL_SECS").unwrap_or_else(|_| "60".to_string());
        let poll_interval_secs =
            poll_raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "POLL_INTERVAL_SECS",
                    value: poll_raw,
                })?;

        Ok(Self {
            reddit_access_token: required("REDDIT_ACCESS_TOKEN")?,
            reddit_user_agent: required("REDDIT_USER_AGENT")?,
            reddit_username: required("REDDIT_USER_NAME")?,
            twitter_bearer_token: required("TWITTER_BEARER_TOKEN")?,
            imgur_client_id: required("IMGUR_CLIENT_ID")?,
            streamable_username: required("STREAMABLE_USERNAME")?,
            streamable_password: required("STREAMABLE_PASSWORD")?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            poll_interval_secs,
            flags: MirrorFlags {
                photos: flag("MIRROR_PHOTOS", true)?,
                videos: flag("MIRROR_VIDEOS", true)?,
                animated: flag("MIRROR_ANIMATED", true)?,
            },
        })
    }
}
