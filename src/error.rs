//! Shared error types for collaborator lookups.

use thiserror::Error;

/// Errors from read-only HTTP lookups against a collaborator service
/// (Reddit listings and comments, Twitter status fetches, short-link
/// resolution).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {status} {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl FetchError {
    /// Build a `Status` error from a non-success response, consuming its body.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        FetchError::Status { status, body }
    }
}
