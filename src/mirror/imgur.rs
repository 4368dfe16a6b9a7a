//! Imgur image host client.

use async_trait::async_trait;
use serde::Deserialize;

use super::{ImageHost, UploadError};

const DEFAULT_BASE_URL: &str = "https://api.imgur.com";

/// Anonymous Imgur API client. Uploads by URL; Imgur fetches the source
/// image itself and returns the hosted link.
pub struct ImgurClient {
    client: reqwest::Client,
    client_id: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    link: Option<String>,
}

impl ImgurClient {
    pub fn new(client_id: String) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            client_id,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (testing).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ImageHost for ImgurClient {
    async fn upload_image(
        &self,
        source_url: &str,
        title: &str,
        description: &str,
    ) -> Result<String, UploadError> {
        let response = self
            .client
            .post(format!("{}/3/image", self.base_url))
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .form(&[
                ("image", source_url),
                ("type", "url"),
                ("title", title),
                ("description", description),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected { status, body });
        }

        let payload: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::MalformedResponse(e.to_string()))?;
        payload
            .data
            .link
            .ok_or_else(|| UploadError::MalformedResponse("missing data.link".to_string()))
    }
}
