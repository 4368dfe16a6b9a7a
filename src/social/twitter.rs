//! Twitter API client.
//!
//! Fetches statuses in extended mode so the full text and the
//! `extended_entities` media block are present. Older photo-only tweets may
//! carry media only under plain `entities`; those classify as photos when
//! the URL points at the media CDN path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::SocialClient;
use crate::error::FetchError;
use crate::matcher::StatusId;
use crate::media::{MediaAttachment, MediaKind, MediaVariant, SourcePost};

const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

/// Twitter's v1.1 timestamp format, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

pub struct TwitterClient {
    client: reqwest::Client,
    bearer_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TweetPayload {
    id_str: String,
    full_text: Option<String>,
    text: Option<String>,
    created_at: String,
    user: UserPayload,
    extended_entities: Option<EntitiesPayload>,
    entities: Option<EntitiesPayload>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    name: String,
    screen_name: String,
    #[serde(default)]
    verified: bool,
}

#[derive(Debug, Deserialize)]
struct EntitiesPayload {
    #[serde(default)]
    media: Vec<MediaPayload>,
}

#[derive(Debug, Deserialize)]
struct MediaPayload {
    #[serde(rename = "type", default)]
    kind: String,
    media_url_https: Option<String>,
    media_url: Option<String>,
    video_info: Option<VideoInfoPayload>,
}

#[derive(Debug, Deserialize)]
struct VideoInfoPayload {
    #[serde(default)]
    variants: Vec<VariantPayload>,
}

#[derive(Debug, Deserialize)]
struct VariantPayload {
    content_type: String,
    url: String,
}

impl TwitterClient {
    pub fn new(bearer_token: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            bearer_token,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (testing).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

impl MediaPayload {
    fn source_url(&self) -> String {
        self.media_url_https
            .clone()
            .or_else(|| self.media_url.clone())
            .unwrap_or_default()
    }

    fn into_attachment(self) -> Option<MediaAttachment> {
        let kind = match self.kind.as_str() {
            "photo" => MediaKind::Photo,
            "animated_gif" => MediaKind::Animated,
            "video" => MediaKind::Video,
            _ => return None,
        };
        let media_url = self.source_url();
        let variants = self
            .video_info
            .map(|info| {
                info.variants
                    .into_iter()
                    .map(|variant| MediaVariant {
                        content_type: variant.content_type,
                        url: variant.url,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(MediaAttachment {
            kind,
            media_url,
            variants,
        })
    }

    /// Legacy shape: `entities.media` entries carry no `type` worth trusting;
    /// a media-CDN URL means photo.
    fn into_legacy_photo(self) -> Option<MediaAttachment> {
        let media_url = self.source_url();
        if !media_url.contains("/media/") {
            return None;
        }
        Some(MediaAttachment {
            kind: MediaKind::Photo,
            media_url,
            variants: Vec::new(),
        })
    }
}

fn into_source_post(payload: TweetPayload) -> Result<SourcePost, FetchError> {
    let created_at: DateTime<Utc> =
        DateTime::parse_from_str(&payload.created_at, CREATED_AT_FORMAT)
            .map_err(|e| FetchError::Parse(format!("created_at: {e}")))?
            .with_timezone(&Utc);

    let attachments = match payload.extended_entities {
        Some(entities) => entities
            .media
            .into_iter()
            .filter_map(MediaPayload::into_attachment)
            .collect(),
        None => payload
            .entities
            .map(|entities| {
                entities
                    .media
                    .into_iter()
                    .filter_map(MediaPayload::into_legacy_photo)
                    .collect()
            })
            .unwrap_or_default(),
    };

    Ok(SourcePost {
        id: StatusId::new(payload.id_str),
        author_name: payload.user.name,
        author_handle: payload.user.screen_name,
        verified: payload.user.verified,
        created_at,
        text: payload.full_text.or(payload.text).unwrap_or_default(),
        attachments,
    })
}

#[async_trait]
impl SocialClient for TwitterClient {
    async fn get_post(&self, status_id: &StatusId) -> Result<SourcePost, FetchError> {
        let response = self
            .client
            .get(format!("{}/1.1/statuses/show.json", self.base_url))
            .query(&[("id", status_id.as_str()), ("tweet_mode", "extended")])
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::from_response(response).await);
        }
        let payload: TweetPayload = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;
        into_source_post(payload)
    }
}
