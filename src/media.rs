//! Tweet media model, classification, and extraction.
//!
//! A fetched tweet carries an ordered list of media attachments. The
//! pipeline first classifies the tweet as a whole (video beats animated GIF
//! beats photo), then extracts the per-attachment source URLs for the
//! winning kind.

use chrono::{DateTime, Utc};

use crate::matcher::StatusId;

/// Kind reported by a single media attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Animated,
    Video,
}

/// Classification of a whole tweet. `Unclassified` means no recognized media
/// and must make the pipeline no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Unclassified,
    Photo,
    Animated,
    Video,
}

/// One encoding of a video/animated attachment. Only `video/mp4` variants
/// are eligible for mirroring.
#[derive(Debug, Clone)]
pub struct MediaVariant {
    pub content_type: String,
    pub url: String,
}

/// A single media entry on a tweet, in source order.
#[derive(Debug, Clone)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    /// Direct URL for photo attachments.
    pub media_url: String,
    /// Encoding variants for video/animated attachments; empty for photos.
    pub variants: Vec<MediaVariant>,
}

/// A fetched tweet. Immutable once built; owned by the pipeline for the
/// duration of one submission.
#[derive(Debug, Clone)]
pub struct SourcePost {
    pub id: StatusId,
    pub author_name: String,
    pub author_handle: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub attachments: Vec<MediaAttachment>,
}

fn precedence(class: MediaClass) -> u8 {
    match class {
        MediaClass::Unclassified => 0,
        MediaClass::Photo => 1,
        MediaClass::Animated => 2,
        MediaClass::Video => 3,
    }
}

/// Classify a tweet from its attachments.
///
/// Explicit fold over the attachment list: higher-precedence kinds win, and
/// among equal-precedence entries the last one seen wins. The tie-break has
/// no observable effect today (the class carries no per-attachment data) but
/// documents the behavior inherited from the extraction loops.
pub fn classify(post: &SourcePost) -> MediaClass {
    post.attachments
        .iter()
        .fold(MediaClass::Unclassified, |acc, attachment| {
            let seen = match attachment.kind {
                MediaKind::Photo => MediaClass::Photo,
                MediaKind::Animated => MediaClass::Animated,
                MediaKind::Video => MediaClass::Video,
            };
            if precedence(seen) >= precedence(acc) {
                seen
            } else {
                acc
            }
        })
}

/// Source URLs of the tweet's photos, in attachment order.
pub fn extract_photos(post: &SourcePost) -> Vec<String> {
    post.attachments
        .iter()
        .filter(|attachment| attachment.kind == MediaKind::Photo)
        .map(|attachment| attachment.media_url.clone())
        .collect()
}

/// Eligible mp4 URLs for the tweet's video attachments, one per attachment,
/// in attachment order.
pub fn extract_video_variants(post: &SourcePost) -> Vec<String> {
    mp4_variants(post, MediaKind::Video)
}

/// Eligible mp4 URLs for the tweet's animated-GIF attachments.
pub fn extract_animated_variants(post: &SourcePost) -> Vec<String> {
    mp4_variants(post, MediaKind::Animated)
}

/// Per attachment of `kind`, the last `video/mp4` variant in source order.
/// Last-wins matches the historical behavior; attachments with no mp4
/// variant contribute nothing.
fn mp4_variants(post: &SourcePost, kind: MediaKind) -> Vec<String> {
    post.attachments
        .iter()
        .filter(|attachment| attachment.kind == kind)
        .filter_map(|attachment| {
            attachment
                .variants
                .iter()
                .filter(|variant| variant.content_type.contains("video/mp4"))
                .fold(None, |_, variant| Some(variant.url.clone()))
        })
        .collect()
}
