//! Reply composition: mirror header, quoted tweet text, attribution,
//! timestamp, and footer, with Reddit-markdown escaping of the quoted text.
//!
//! The quoted text is attacker-controlled (it comes straight from the
//! tweet), so every markdown control character gets a backslash escape, and
//! `t.co` short links are resolved or stripped before escaping so raw
//! shorteners never leak into the reply.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::matcher;
use crate::media::{MediaKind, SourcePost};
use crate::mirror::MirrorResult;

/// Fixed footer, identical across all replies.
pub const REPLY_FOOTER: &str = "beep^boop | \
    [source](https://github.com/tweetmirror-bot/tweetmirror \"GitHub\") | \
    [report issue](https://www.reddit.com/message/compose/?to=tweetmirror&subject=issue_report&message=[enter_issue] \"Report issue\") | \
    [contact](https://www.reddit.com/user/tweetmirror/ \"/u/tweetmirror\")";

/// Markdown control characters, optionally preceded by their own escape.
/// Matching the escaped pair as a unit is what makes sanitization
/// idempotent: an already-escaped sequence passes through untouched.
static MD_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\?[#*^~\\_>`\[\]]").expect("markdown escape regex"));

/// Escape markdown control characters (hash, star, caret, tilde, backslash,
/// underscore, angle bracket, backtick, square brackets) with a preceding
/// backslash. Idempotent: applying it to its own output is a no-op.
pub fn sanitize_markdown(text: &str) -> String {
    MD_ESCAPE_RE
        .replace_all(text, |caps: &Captures| {
            let m = &caps[0];
            if m.len() >= 2 {
                // Backslash followed by a control character: already escaped.
                m.to_string()
            } else {
                format!("\\{m}")
            }
        })
        .into_owned()
}

/// Resolve or strip `t.co` short links embedded in tweet text.
///
/// Per link, with a two-hop redirect bound: two hops ending at a tweet URL
/// would be redundant with the mirror header, so the link is removed; two
/// hops ending elsewhere are replaced with the first hop's destination (the
/// URL the shortener actually wrapped); at most one hop ending at a tweet
/// URL is also removed; at most one hop ending elsewhere stays as-is.
/// Resolution failures strip the link rather than leak it.
pub async fn resolve_short_links(client: &reqwest::Client, text: &str) -> String {
    let mut out = text.to_string();
    for link in matcher::short_links(text) {
        let replacement = match matcher::follow_redirects(client, &link, 2).await {
            Ok(chain) => match short_link_replacement(&chain) {
                Some(replacement) => replacement,
                None => continue,
            },
            Err(err) => {
                tracing::debug!(link = %link, error = %err, "short link resolution failed, stripping");
                String::new()
            }
        };
        out = out.replace(&link, &replacement);
    }
    out
}

/// What a resolved short link becomes in the text: `Some("")` strips it,
/// `Some(url)` substitutes, `None` leaves it unchanged.
fn short_link_replacement(chain: &matcher::RedirectChain) -> Option<String> {
    if chain.hops.len() >= 2 {
        if matcher::is_tweet_url(&chain.final_url) {
            Some(String::new())
        } else {
            Some(chain.hops[0].clone())
        }
    } else if matcher::is_tweet_url(&chain.final_url) {
        Some(String::new())
    } else {
        None
    }
}

fn mirror_label(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Photo => "Imgur mirror image",
        MediaKind::Animated | MediaKind::Video => "Streamable mirror video",
    }
}

/// Render the reply body from already-sanitized quoted text.
///
/// Sections in fixed order, blank-line separated: mirror header, quoted
/// text (only when non-empty), attribution, timestamp, divider, footer.
pub fn render(post: &SourcePost, mirrors: &MirrorResult, quoted: &str) -> String {
    let label = mirror_label(mirrors.kind);
    let mut body = String::new();

    for (i, url) in mirrors.urls.iter().enumerate() {
        let title = if mirrors.urls.len() > 1 {
            format!("{label}{:>2}", i + 1)
        } else {
            label.to_string()
        };
        body.push_str(&format!("##[{title}]({url} \"{title}\")\n"));
    }
    body.push('\n');

    if !quoted.is_empty() {
        body.push_str(&format!("\"{quoted}\"\n\n"));
    }

    let handle = post.author_handle.trim();
    let verified = if post.verified { " ^([verified])" } else { "" };
    body.push_str(&format!(
        "~ {} ([@{handle}](https://twitter.com/{handle}/ \"Twitter profile\")){verified}\n\n",
        post.author_name.trim(),
    ));

    body.push_str(&format!(
        "^(Tweeted on {} at {})\n\n",
        post.created_at.format("%Y-%m-%d"),
        post.created_at.format("%H:%M:%S"),
    ));

    body.push_str("&nbsp;\n\n****\n");
    body.push_str(REPLY_FOOTER);
    body
}

/// Full composition: resolve short links in the tweet text, escape it, and
/// render the reply. `client` must have redirects disabled (see
/// [`matcher::redirect_client`]).
pub async fn compose(
    client: &reqwest::Client,
    post: &SourcePost,
    mirrors: &MirrorResult,
) -> String {
    let resolved = resolve_short_links(client, post.text.trim()).await;
    let quoted = sanitize_markdown(&resolved);
    render(post, mirrors, quoted.trim())
}
