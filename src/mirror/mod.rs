//! Mirror hosting: re-upload tweet media to third-party hosts.
//!
//! Photos go to Imgur, videos and animated GIFs to Streamable. Each host is
//! behind its own trait so the pipeline can be driven with in-memory fakes
//! and so a failure against one host never touches the other's state.

mod imgur;
mod streamable;

pub use imgur::ImgurClient;
pub use streamable::StreamableClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::media::MediaKind;

/// Fixed description attached to Imgur uploads.
pub const MIRROR_DESCRIPTION: &str =
    "Image mirrored by /u/tweetmirror (https://www.reddit.com/u/tweetmirror).";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mirror host rejected upload: {status} {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed upload response: {0}")]
    MalformedResponse(String),
}

/// Image mirror host. One call is one blocking upload; the host fetches the
/// source URL itself.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload_image(
        &self,
        source_url: &str,
        title: &str,
        description: &str,
    ) -> Result<String, UploadError>;
}

/// Video mirror host.
#[async_trait]
pub trait VideoHost: Send + Sync {
    async fn upload_video(&self, source_url: &str, title: &str) -> Result<String, UploadError>;
}

/// Hosted mirror URLs for one submission, in the same order as the source
/// attachments they replace.
#[derive(Debug, Clone)]
pub struct MirrorResult {
    pub kind: MediaKind,
    pub urls: Vec<String>,
}

/// Upload title for a photo mirror, derived from the tweet author.
pub fn photo_title(author_name: &str) -> String {
    format!("Tweet by @{author_name}")
}

/// Upload title for a video mirror.
pub fn video_title(author_name: &str) -> String {
    format!("Tweet by @{author_name} (Mirror)")
}
