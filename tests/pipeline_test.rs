//! End-to-end pipeline tests against in-memory collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::TimeZone;

use tweetmirror::config::MirrorFlags;
use tweetmirror::error::FetchError;
use tweetmirror::forum::{ForumClient, ReplyError, Submission};
use tweetmirror::ledger::{MemoryLedger, VisitLedger, NO_REPLY_SENTINEL};
use tweetmirror::matcher::StatusId;
use tweetmirror::media::{MediaAttachment, MediaKind, MediaVariant, SourcePost};
use tweetmirror::mirror::{ImageHost, UploadError, VideoHost};
use tweetmirror::pipeline::{Outcome, Pipeline};
use tweetmirror::social::SocialClient;

struct FakeForum {
    comment_authors: Vec<String>,
    replies: Mutex<Vec<(String, String)>>,
    fail_reply: bool,
}

impl FakeForum {
    fn new() -> Self {
        Self {
            comment_authors: Vec::new(),
            replies: Mutex::new(Vec::new()),
            fail_reply: false,
        }
    }

    fn with_comment_authors(mut self, authors: &[&str]) -> Self {
        self.comment_authors = authors.iter().map(|a| a.to_string()).collect();
        self
    }

    fn reply_count(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl ForumClient for FakeForum {
    async fn new_submissions(&self, _multi: &str) -> Result<Vec<Submission>, FetchError> {
        Ok(Vec::new())
    }

    async fn comment_authors(&self, _submission_id: &str) -> Result<Vec<String>, FetchError> {
        Ok(self.comment_authors.clone())
    }

    async fn post_reply(&self, submission_id: &str, body: &str) -> Result<(), ReplyError> {
        if self.fail_reply {
            return Err(ReplyError::Rejected {
                status: 403,
                body: "forbidden".to_string(),
            });
        }
        self.replies
            .lock()
            .unwrap()
            .push((submission_id.to_string(), body.to_string()));
        Ok(())
    }

    fn bot_username(&self) -> &str {
        "tweetmirror"
    }
}

struct FakeSocial {
    posts: HashMap<String, SourcePost>,
    calls: Mutex<usize>,
}

impl FakeSocial {
    fn with_post(post: SourcePost) -> Self {
        let mut posts = HashMap::new();
        posts.insert(post.id.as_str().to_string(), post);
        Self {
            posts,
            calls: Mutex::new(0),
        }
    }

    fn empty() -> Self {
        Self {
            posts: HashMap::new(),
            calls: Mutex::new(0),
        }
    }

    fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl SocialClient for FakeSocial {
    async fn get_post(&self, status_id: &StatusId) -> Result<SourcePost, FetchError> {
        *self.calls.lock().unwrap() += 1;
        self.posts
            .get(status_id.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Parse(format!("unknown status {status_id}")))
    }
}

struct FakeImages {
    uploads: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeImages {
    fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageHost for FakeImages {
    async fn upload_image(
        &self,
        source_url: &str,
        _title: &str,
        _description: &str,
    ) -> Result<String, UploadError> {
        if self.fail {
            return Err(UploadError::Rejected {
                status: 500,
                body: "boom".to_string(),
            });
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(source_url.to_string());
        Ok(format!("https://i.imgur.com/mirror{}.jpg", uploads.len()))
    }
}

struct FakeVideos {
    uploads: Mutex<Vec<String>>,
}

impl FakeVideos {
    fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
        }
    }

    fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl VideoHost for FakeVideos {
    async fn upload_video(&self, source_url: &str, _title: &str) -> Result<String, UploadError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(source_url.to_string());
        Ok(format!("https://streamable.com/code{}", uploads.len()))
    }
}

struct Harness {
    forum: Arc<FakeForum>,
    social: Arc<FakeSocial>,
    images: Arc<FakeImages>,
    videos: Arc<FakeVideos>,
    ledger: Arc<MemoryLedger>,
    pipeline: Pipeline,
}

fn harness_with(
    forum: FakeForum,
    social: FakeSocial,
    images: FakeImages,
    flags: MirrorFlags,
) -> Harness {
    let forum = Arc::new(forum);
    let social = Arc::new(social);
    let images = Arc::new(images);
    let videos = Arc::new(FakeVideos::new());
    let ledger = Arc::new(MemoryLedger::new());
    let pipeline = Pipeline::new(
        forum.clone(),
        social.clone(),
        images.clone(),
        videos.clone(),
        ledger.clone(),
        flags,
    )
    .unwrap();
    Harness {
        forum,
        social,
        images,
        videos,
        ledger,
        pipeline,
    }
}

fn photo_post(id: &str, photos: &[&str]) -> SourcePost {
    SourcePost {
        id: StatusId::new(id),
        author_name: "Display Name".to_string(),
        author_handle: "handle".to_string(),
        verified: false,
        created_at: chrono::Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap(),
        text: "just words, no links".to_string(),
        attachments: photos
            .iter()
            .map(|url| MediaAttachment {
                kind: MediaKind::Photo,
                media_url: url.to_string(),
                variants: Vec::new(),
            })
            .collect(),
    }
}

fn video_post(id: &str) -> SourcePost {
    let mut post = photo_post(id, &[]);
    post.attachments = vec![MediaAttachment {
        kind: MediaKind::Video,
        media_url: String::new(),
        variants: vec![MediaVariant {
            content_type: "video/mp4".to_string(),
            url: "https://video.example/v.mp4".to_string(),
        }],
    }];
    post
}

fn submission(id: &str, url: &str) -> Submission {
    Submission {
        id: id.to_string(),
        subreddit: "pics".to_string(),
        url: url.to_string(),
        title: "a tweet".to_string(),
    }
}

fn no_exclusions() -> HashSet<String> {
    HashSet::new()
}

#[tokio::test]
async fn test_single_photo_end_to_end() {
    let h = harness_with(
        FakeForum::new(),
        FakeSocial::with_post(photo_post("999", &["https://pbs.example/p.jpg"])),
        FakeImages::new(),
        MirrorFlags::default(),
    );
    let sub = submission("abc123", "https://twitter.com/user/status/999");

    let outcome = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(outcome, Outcome::Committed(ref id) if id.as_str() == "999"));

    assert_eq!(h.images.upload_count(), 1);
    assert_eq!(h.forum.reply_count(), 1);
    assert_eq!(h.ledger.get("abc123").await.as_deref(), Some("999"));

    let replies = h.forum.replies.lock().unwrap();
    let body = &replies[0].1;
    // Single mirror: one header line, not numbered.
    assert!(body.contains("##[Imgur mirror image](https://i.imgur.com/mirror1.jpg"));
    assert!(!body.contains("Imgur mirror image 1"));
    assert_eq!(body.matches("##[").count(), 1);
}

#[tokio::test]
async fn test_second_run_is_dedup_skipped_with_zero_calls() {
    let h = harness_with(
        FakeForum::new(),
        FakeSocial::with_post(photo_post("999", &["https://pbs.example/p.jpg"])),
        FakeImages::new(),
        MirrorFlags::default(),
    );
    let sub = submission("abc123", "https://twitter.com/user/status/999");

    let first = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(first, Outcome::Committed(_)));
    let fetches_after_first = h.social.call_count();

    let second = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(second, Outcome::DedupSkipped));
    assert_eq!(h.social.call_count(), fetches_after_first);
    assert_eq!(h.images.upload_count(), 1);
    assert_eq!(h.forum.reply_count(), 1);
}

#[tokio::test]
async fn test_upload_failure_posts_nothing_and_records_nothing() {
    let h = harness_with(
        FakeForum::new(),
        FakeSocial::with_post(photo_post("999", &["https://pbs.example/p.jpg"])),
        FakeImages::failing(),
        MirrorFlags::default(),
    );
    let sub = submission("abc123", "https://twitter.com/user/status/999");

    let outcome = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(outcome, Outcome::Failed(_)));
    assert_eq!(h.forum.reply_count(), 0);
    assert!(!h.ledger.has_visited("abc123").await.unwrap());
}

#[tokio::test]
async fn test_reply_failure_leaves_no_ledger_record() {
    let mut forum = FakeForum::new();
    forum.fail_reply = true;
    let h = harness_with(
        forum,
        FakeSocial::with_post(photo_post("999", &["https://pbs.example/p.jpg"])),
        FakeImages::new(),
        MirrorFlags::default(),
    );
    let sub = submission("abc123", "https://twitter.com/user/status/999");

    let outcome = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(outcome, Outcome::Failed(_)));
    assert!(!h.ledger.has_visited("abc123").await.unwrap());
}

#[tokio::test]
async fn test_tweet_without_media_commits_sentinel() {
    let h = harness_with(
        FakeForum::new(),
        FakeSocial::with_post(photo_post("999", &[])),
        FakeImages::new(),
        MirrorFlags::default(),
    );
    let sub = submission("abc123", "https://twitter.com/user/status/999");

    let outcome = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(outcome, Outcome::NoMedia));
    assert_eq!(h.images.upload_count(), 0);
    assert_eq!(h.forum.reply_count(), 0);
    assert_eq!(
        h.ledger.get("abc123").await.as_deref(),
        Some(NO_REPLY_SENTINEL)
    );
}

#[tokio::test]
async fn test_existing_bot_reply_self_heals_ledger() {
    let h = harness_with(
        FakeForum::new().with_comment_authors(&["someone", "tweetmirror"]),
        FakeSocial::with_post(photo_post("999", &["https://pbs.example/p.jpg"])),
        FakeImages::new(),
        MirrorFlags::default(),
    );
    let sub = submission("abc123", "https://twitter.com/user/status/999");

    let outcome = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(outcome, Outcome::AlreadyReplied));
    assert_eq!(h.forum.reply_count(), 0);
    assert_eq!(h.images.upload_count(), 0);
    assert_eq!(h.ledger.get("abc123").await.as_deref(), Some("999"));
}

#[tokio::test]
async fn test_non_tweet_url_is_filtered_out() {
    let h = harness_with(
        FakeForum::new(),
        FakeSocial::empty(),
        FakeImages::new(),
        MirrorFlags::default(),
    );
    let sub = submission("abc123", "https://example.com/article");

    let outcome = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(outcome, Outcome::FilteredOut));
    assert_eq!(h.social.call_count(), 0);
    assert!(!h.ledger.has_visited("abc123").await.unwrap());
}

#[tokio::test]
async fn test_excluded_subreddit_is_filtered_out() {
    let h = harness_with(
        FakeForum::new(),
        FakeSocial::empty(),
        FakeImages::new(),
        MirrorFlags::default(),
    );
    let sub = submission("abc123", "https://twitter.com/user/status/999");
    let exclude: HashSet<String> = ["pics".to_string()].into_iter().collect();

    let outcome = h.pipeline.process(&sub, &exclude).await;
    assert!(matches!(outcome, Outcome::FilteredOut));
    assert_eq!(h.social.call_count(), 0);
}

#[tokio::test]
async fn test_disabled_kind_skips_without_ledger_write() {
    let h = harness_with(
        FakeForum::new(),
        FakeSocial::with_post(video_post("999")),
        FakeImages::new(),
        MirrorFlags {
            photos: true,
            videos: false,
            animated: false,
        },
    );
    let sub = submission("abc123", "https://twitter.com/user/status/999");

    let outcome = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(outcome, Outcome::KindDisabled));
    assert_eq!(h.videos.upload_count(), 0);
    assert_eq!(h.forum.reply_count(), 0);
    assert!(!h.ledger.has_visited("abc123").await.unwrap());
}

#[tokio::test]
async fn test_video_tweet_mirrors_to_streamable() {
    let h = harness_with(
        FakeForum::new(),
        FakeSocial::with_post(video_post("999")),
        FakeImages::new(),
        MirrorFlags::default(),
    );
    let sub = submission("abc123", "https://twitter.com/user/status/999");

    let outcome = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(outcome, Outcome::Committed(_)));
    assert_eq!(h.videos.upload_count(), 1);
    assert_eq!(h.images.upload_count(), 0);

    let replies = h.forum.replies.lock().unwrap();
    assert!(replies[0].1.contains("##[Streamable mirror video](https://streamable.com/code1"));
}

#[tokio::test]
async fn test_two_photos_produce_two_numbered_mirrors_in_order() {
    let h = harness_with(
        FakeForum::new(),
        FakeSocial::with_post(photo_post(
            "999",
            &["https://pbs.example/p1.jpg", "https://pbs.example/p2.jpg"],
        )),
        FakeImages::new(),
        MirrorFlags::default(),
    );
    let sub = submission("abc123", "https://twitter.com/user/status/999");

    let outcome = h.pipeline.process(&sub, &no_exclusions()).await;
    assert!(matches!(outcome, Outcome::Committed(_)));
    assert_eq!(h.images.upload_count(), 2);

    // Uploads happen in attachment order.
    let uploads = h.images.uploads.lock().unwrap();
    assert_eq!(
        *uploads,
        vec![
            "https://pbs.example/p1.jpg".to_string(),
            "https://pbs.example/p2.jpg".to_string()
        ]
    );

    let replies = h.forum.replies.lock().unwrap();
    let body = &replies[0].1;
    let first = body.find("Imgur mirror image 1").unwrap();
    let second = body.find("Imgur mirror image 2").unwrap();
    assert!(first < second);
    assert_eq!(body.matches("##[").count(), 2);
}
