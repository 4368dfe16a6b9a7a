//! Social-media collaborator: fetching the source post behind a submission
//! link.

mod twitter;

pub use twitter::TwitterClient;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::matcher::StatusId;
use crate::media::SourcePost;

/// Source-post lookups the pipeline needs.
#[async_trait]
pub trait SocialClient: Send + Sync {
    async fn get_post(&self, status_id: &StatusId) -> Result<SourcePost, FetchError>;
}
