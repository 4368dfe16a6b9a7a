//! Reddit API client.
//!
//! Talks to the OAuth API with a pre-acquired bearer token; token refresh is
//! outside this bot's scope. Reddit requires a descriptive User-Agent on
//! every request.

use async_trait::async_trait;
use serde::Deserialize;

use super::{ForumClient, ReplyError, Submission};
use crate::error::FetchError;

const DEFAULT_BASE_URL: &str = "https://oauth.reddit.com";

pub struct RedditClient {
    client: reqwest::Client,
    token: String,
    username: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: ThingData,
}

#[derive(Debug, Deserialize)]
struct ThingData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: Option<String>,
}

impl RedditClient {
    pub fn new(
        token: String,
        username: String,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            token,
            username,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (testing).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: String) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::from_response(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ForumClient for RedditClient {
    async fn new_submissions(&self, multi: &str) -> Result<Vec<Submission>, FetchError> {
        let listing: Listing = self
            .get_json(format!("{}/r/{multi}/new?limit=100&raw_json=1", self.base_url))
            .await?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|thing| Submission {
                id: thing.data.id,
                subreddit: thing.data.subreddit,
                url: thing.data.url,
                title: thing.data.title,
            })
            .collect())
    }

    async fn comment_authors(&self, submission_id: &str) -> Result<Vec<String>, FetchError> {
        // The comments endpoint returns a two-element array: the submission
        // itself, then the comment tree.
        let listings: Vec<Listing> = self
            .get_json(format!(
                "{}/comments/{submission_id}?limit=100&depth=1&raw_json=1",
                self.base_url
            ))
            .await?;
        let Some(comments) = listings.into_iter().nth(1) else {
            return Ok(Vec::new());
        };
        Ok(comments
            .data
            .children
            .into_iter()
            .filter_map(|thing| thing.data.author)
            .collect())
    }

    async fn post_reply(&self, submission_id: &str, body: &str) -> Result<(), ReplyError> {
        let response = self
            .client
            .post(format!("{}/api/comment", self.base_url))
            .bearer_auth(&self.token)
            .form(&[
                ("api_type", "json"),
                ("thing_id", &format!("t3_{submission_id}")),
                ("text", body),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ReplyError::Rejected { status, body });
        }
        Ok(())
    }

    fn bot_username(&self) -> &str {
        &self.username
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RedditClient {
        RedditClient::new("token".to_string(), "tweetmirror".to_string(), "test-agent")
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_new_submissions_parses_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/pics/new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "children": [
                    { "data": { "id": "abc123", "subreddit": "pics",
                                "url": "https://twitter.com/u/status/1", "title": "look" } }
                ] }
            })))
            .mount(&server)
            .await;

        let submissions = client(&server).new_submissions("pics").await.unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].id, "abc123");
        assert_eq!(submissions[0].subreddit, "pics");
    }

    #[tokio::test]
    async fn test_comment_authors_reads_second_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/comments/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "data": { "children": [ { "data": { "id": "abc123" } } ] } },
                { "data": { "children": [
                    { "data": { "author": "someone" } },
                    { "data": { "author": "tweetmirror" } }
                ] } }
            ])))
            .mount(&server)
            .await;

        let authors = client(&server).comment_authors("abc123").await.unwrap();
        assert_eq!(authors, vec!["someone".to_string(), "tweetmirror".to_string()]);
    }

    #[tokio::test]
    async fn test_post_reply_rejection_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/comment"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client(&server).post_reply("abc123", "body").await.unwrap_err();
        assert!(matches!(err, ReplyError::Rejected { status: 403, .. }));
    }
}
