use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use tweetmirror::cli::{Cli, Command, StartArgs};
use tweetmirror::config::{Settings, Watchlists};
use tweetmirror::forum::RedditClient;
use tweetmirror::ledger::RedisLedger;
use tweetmirror::logging::{self, LogConfig};
use tweetmirror::mirror::{ImgurClient, StreamableClient};
use tweetmirror::pipeline::Pipeline;
use tweetmirror::social::TwitterClient;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Start(StartArgs::default())) {
        Command::Start(args) => start(args).await,
        Command::CheckConfig { config_dir } => check_config(&config_dir),
        Command::Version => {
            println!(
                "tweetmirror {} ({}, built {})",
                env!("CARGO_PKG_VERSION"),
                env!("TWEETMIRROR_GIT_HASH"),
                env!("TWEETMIRROR_BUILD_DATE"),
            );
            ExitCode::SUCCESS
        }
    }
}

async fn start(args: StartArgs) -> ExitCode {
    if let Err(err) = logging::init(&LogConfig {
        level: args.log_level.clone(),
        json: args.json_logs,
    }) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match build_pipeline(&settings).await {
        Ok(pipeline) => pipeline,
        Err(err) => {
            tracing::error!(error = %err, "failed to construct pipeline");
            return ExitCode::FAILURE;
        }
    };

    loop {
        scan_cycle(&pipeline, &args).await;
        if args.once {
            return ExitCode::SUCCESS;
        }
        tokio::time::sleep(Duration::from_secs(settings.poll_interval_secs)).await;
    }
}

async fn build_pipeline(settings: &Settings) -> Result<Pipeline, String> {
    let forum = RedditClient::new(
        settings.reddit_access_token.clone(),
        settings.reddit_username.clone(),
        &settings.reddit_user_agent,
    )
    .map_err(|e| format!("reddit client: {e}"))?;
    let social = TwitterClient::new(settings.twitter_bearer_token.clone())
        .map_err(|e| format!("twitter client: {e}"))?;
    let images = ImgurClient::new(settings.imgur_client_id.clone())
        .map_err(|e| format!("imgur client: {e}"))?;
    let videos = StreamableClient::new(
        settings.streamable_username.clone(),
        settings.streamable_password.clone(),
    )
    .map_err(|e| format!("streamable client: {e}"))?;
    let ledger = RedisLedger::connect(&settings.redis_url)
        .await
        .map_err(|e| format!("redis ledger: {e}"))?;

    Pipeline::new(
        Arc::new(forum),
        Arc::new(social),
        Arc::new(images),
        Arc::new(videos),
        Arc::new(ledger),
        settings.flags,
    )
    .map_err(|e| format!("http client: {e}"))
}

/// One cycle: reload watchlists, list the multi, process every submission.
/// Watchlist problems skip the cycle; they never take the bot down.
async fn scan_cycle(pipeline: &Pipeline, args: &StartArgs) {
    let lists = match Watchlists::load(&args.config_dir) {
        Ok(lists) => lists,
        Err(err) => {
            tracing::error!(error = %err, "failed to load watchlists, skipping cycle");
            return;
        }
    };
    let multi = lists.multi();
    if multi.is_empty() {
        tracing::warn!("no subreddits configured, skipping cycle");
        return;
    }

    tracing::info!(%multi, "checking subreddits");
    println!("checking subreddits {multi} ...");

    let summary = pipeline.scan(&multi, &lists.deny_set()).await;
    tracing::info!(
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        "scan cycle complete"
    );
}

fn check_config(config_dir: &std::path::Path) -> ExitCode {
    let mut ok = true;
    match Settings::from_env() {
        Ok(_) => println!("environment settings: ok"),
        Err(err) => {
            ok = false;
            eprintln!("environment settings: {err}");
        }
    }
    match Watchlists::load(config_dir) {
        Ok(lists) => {
            println!(
                "watchlists: ok ({} allowed, {} denied)",
                lists.allow.len(),
                lists.deny.len()
            );
            if lists.multi().is_empty() {
                eprintln!("warning: allow-list is empty, nothing will be scanned");
            }
        }
        Err(err) => {
            ok = false;
            eprintln!("watchlists: {err}");
        }
    }
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
