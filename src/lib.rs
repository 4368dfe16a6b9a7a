//! tweetmirror library
//!
//! Core pipeline for a Reddit bot that watches subreddits for tweet links,
//! mirrors the linked tweet's media onto third-party hosts (Imgur for photos,
//! Streamable for videos and animated GIFs), and replies to the submission
//! with the mirror links. Each submission is handled at most once, enforced
//! by a Redis-backed visit ledger plus a scan of the submission's own
//! comments for an earlier bot reply.

pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod forum;
pub mod ledger;
pub mod logging;
pub mod matcher;
pub mod media;
pub mod mirror;
pub mod pipeline;
pub mod social;
