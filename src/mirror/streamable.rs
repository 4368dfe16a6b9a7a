//! Streamable video host client.

use async_trait::async_trait;
use serde::Deserialize;

use super::{UploadError, VideoHost};

const DEFAULT_BASE_URL: &str = "https://api.streamable.com";

/// Streamable import client. The import endpoint makes Streamable fetch the
/// source video itself; the returned shortcode becomes the public URL.
pub struct StreamableClient {
    client: reqwest::Client,
    username: String,
    password: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ImportResponse {
    shortcode: Option<String>,
}

impl StreamableClient {
    pub fn new(username: String, password: String) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            username,
            password,
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
impl VideoHost for StreamableClient {
    async fn upload_video(&self, source_url: &str, title: &str) -> Result<String, UploadError> {
        let response = self
            .client
            .get(format!("{}/import", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("url", source_url), ("title", title)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected { status, body });
        }

        let payload: ImportResponse = response
            .json()
            .await
            .map_err(|e| UploadError::MalformedResponse(e.to_string()))?;
        let shortcode = payload
            .shortcode
            .ok_or_else(|| UploadError::MalformedResponse("missing shortcode".to_string()))?;
        Ok(format!("https://streamable.com/{shortcode}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_import_composes_hosted_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/import"))
            .and(query_param("url", "https://video.example/v.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "shortcode": "ab12" })),
            )
            .mount(&server)
            .await;

        let client = StreamableClient::new("user".to_string(), "pass".to_string())
            .unwrap()
            .with_base_url(server.uri());
        let url = client
            .upload_video("https://video.example/v.mp4", "title")
            .await
            .unwrap();
        assert_eq!(url, "https://streamable.com/ab12");
    }

    #[tokio::test]
    async fn test_non_success_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/import"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = StreamableClient::new("user".to_string(), "pass".to_string())
            .unwrap()
            .with_base_url(server.uri());
        let err = client
            .upload_video("https://video.example/v.mp4", "title")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Rejected { status: 401, .. }));
    }
}
