//! CLI subcommand definitions.
//!
//! - `start` (default) -- run the scan loop
//! - `check-config` -- validate settings and watchlists, then exit
//! - `version` -- print version info

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// tweetmirror -- a Reddit bot that mirrors media from linked tweets.
#[derive(Parser, Debug)]
#[command(
    name = "tweetmirror",
    version = env!("CARGO_PKG_VERSION"),
    about = "Reddit bot that mirrors tweet media onto Imgur and Streamable"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the scan loop (default when no subcommand is given).
    Start(StartArgs),

    /// Validate environment settings and watchlist files, then exit.
    CheckConfig {
        /// Directory containing subreddits.txt and blacklist.txt.
        #[arg(long, default_value = ".")]
        config_dir: PathBuf,
    },

    /// Print version information.
    Version,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Run a single scan cycle and exit instead of looping.
    #[arg(long)]
    pub once: bool,

    /// Directory containing subreddits.txt and blacklist.txt.
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,

    /// Log filter level (overridden by RUST_LOG).
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-formatted output.
    #[arg(long)]
    pub json_logs: bool,
}

impl Default for StartArgs {
    fn default() -> Self {
        Self {
            once: false,
            config_dir: PathBuf::from("."),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
