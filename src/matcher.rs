//! Tweet URL recognition and status-id extraction.
//!
//! Two URL shapes are recognized: the canonical tweet permalink
//! (`twitter.com/<user>/status/<id>`, with a legacy `statuses` variant) and
//! `t.co` short links. Canonical permalinks yield their status id by pattern
//! capture alone; short links get exactly one redirect-resolution hop before
//! the matcher gives up.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::LOCATION;

use crate::error::FetchError;

/// Canonical tweet permalink, anchored. Capture 2 is the numeric status id.
static TWEET_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?twitter\.com/(?:#!/)?(\w+)/status(?:es)?/(\d+)")
        .expect("tweet permalink regex")
});

/// `t.co` short link, anchored.
static SHORT_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://t\.co/(\w+)").expect("short link regex"));

/// `t.co` short link anywhere inside free text.
static SHORT_LINK_SCAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://t\.co/\w+").expect("short link scan regex"));

/// Identifier of a tweet. Kept textual; ids overflow 32-bit integers and are
/// only ever compared or interpolated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusId(String);

impl StatusId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `url` is a tweet permalink or a `t.co` short link.
pub fn is_tweet_url(url: &str) -> bool {
    TWEET_URL_RE.is_match(url) || SHORT_LINK_RE.is_match(url)
}

/// Extract the status id from a canonical tweet permalink, if `url` is one.
/// Query parameters and trailing path segments are ignored.
pub fn capture_status_id(url: &str) -> Option<StatusId> {
    TWEET_URL_RE
        .captures(url)
        .and_then(|caps| caps.get(2))
        .map(|m| StatusId::new(m.as_str()))
}

/// All `t.co` short links occurring in `text`, in order of appearance.
pub fn short_links(text: &str) -> Vec<String> {
    SHORT_LINK_SCAN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Resolve the status id referenced by `url`.
///
/// Canonical permalinks are captured directly with no network call. Short
/// links get a single redirect-resolution hop; if the hop lands on a
/// canonical permalink the id is captured from there. Anything else is
/// `Ok(None)` — callers treat that as "skip", not as an error.
pub async fn resolve_status_id(
    client: &reqwest::Client,
    url: &str,
) -> Result<Option<StatusId>, FetchError> {
    if let Some(id) = capture_status_id(url) {
        return Ok(Some(id));
    }
    if SHORT_LINK_RE.is_match(url) {
        let chain = follow_redirects(client, url, 1).await?;
        return Ok(capture_status_id(&chain.final_url));
    }
    Ok(None)
}

/// Outcome of manually following a redirect chain.
#[derive(Debug, Clone)]
pub struct RedirectChain {
    /// Destination of each followed hop, in order.
    pub hops: Vec<String>,
    /// Where the chain ended: the last hop destination, or the original URL
    /// when the first response was not a redirect.
    pub final_url: String,
}

/// Follow up to `max_hops` HTTP redirects from `url`, recording each hop.
///
/// `client` must have automatic redirects disabled (see
/// [`redirect_client`]) so the hop count stays observable. The bound is an
/// explicit loop counter; a chain longer than `max_hops` is simply truncated.
pub async fn follow_redirects(
    client: &reqwest::Client,
    url: &str,
    max_hops: usize,
) -> Result<RedirectChain, FetchError> {
    let mut current = url.to_string();
    let mut hops = Vec::new();

    for _ in 0..max_hops {
        let response = client.get(&current).send().await?;
        if !response.status().is_redirection() {
            break;
        }
        let Some(location) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
        else {
            break;
        };
        // Location may be relative; resolve it against the current URL.
        let next = match url::Url::parse(&current) {
            Ok(base) => base
                .join(location)
                .map(|joined| joined.to_string())
                .unwrap_or_else(|_| location.to_string()),
            Err(_) => location.to_string(),
        };
        hops.push(next.clone());
        current = next;
    }

    Ok(RedirectChain {
        final_url: current,
        hops,
    })
}

/// Build a client suitable for [`follow_redirects`]: automatic redirects off,
/// so every hop surfaces as a 3xx response.
pub fn redirect_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(std::time::Duration::from_secs(10))
        .timeout(std::time::Duration::from_secs(30))
        .build()
}
