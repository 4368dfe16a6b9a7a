//! Forum collaborator: listing new submissions, scanning comments, and
//! posting replies.

mod reddit;

pub use reddit::RedditClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::FetchError;

/// A link submission, the unit of work for the pipeline. Read-only to the
/// core; produced by the forum listing.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: String,
    pub subreddit: String,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("forum rejected reply: {status} {body}")]
    Rejected { status: u16, body: String },
}

/// Forum operations the pipeline needs. One implementation per forum
/// backend; tests drive the pipeline with an in-memory fake.
#[async_trait]
pub trait ForumClient: Send + Sync {
    /// Newest submissions for a multi-subreddit expression (`a+b-x`), in the
    /// order the forum lists them.
    async fn new_submissions(&self, multi: &str) -> Result<Vec<Submission>, FetchError>;

    /// Authors of the top-level comments on a submission, used to detect an
    /// earlier reply by the bot itself.
    async fn comment_authors(&self, submission_id: &str) -> Result<Vec<String>, FetchError>;

    /// Post a top-level reply on a submission.
    async fn post_reply(&self, submission_id: &str, body: &str) -> Result<(), ReplyError>;

    /// The bot's own account name, for self-authorship checks.
    fn bot_username(&self) -> &str;
}
