//! Submission-processing pipeline.
//!
//! Per submission: exclusion filter, ledger check, URL match, comment scan,
//! tweet fetch, classify/extract, mirror uploads, reply, ledger commit. One
//! submission's failure never stops the scan; outcomes are logged
//! structurally and echoed as a status line on stdout.
//!
//! Collaborators are injected as trait objects, so the whole pipeline runs
//! against in-memory fakes in tests.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::compose;
use crate::config::MirrorFlags;
use crate::error::FetchError;
use crate::forum::{ForumClient, ReplyError, Submission};
use crate::ledger::{self, LedgerError, VisitLedger};
use crate::matcher::{self, StatusId};
use crate::media::{self, MediaClass, MediaKind, SourcePost};
use crate::mirror::{self, ImageHost, MirrorResult, UploadError, VideoHost};
use crate::social::SocialClient;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Reply(#[from] ReplyError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Terminal state for one submission.
#[derive(Debug)]
pub enum Outcome {
    /// Excluded subreddit or non-tweet URL; no side effects.
    FilteredOut,
    /// Ledger already has a record; no side effects.
    DedupSkipped,
    /// No ledger record, but the bot already replied; the record is written
    /// to self-heal a missed earlier commit. No new reply.
    AlreadyReplied,
    /// Tweet carries no recognized (or no eligible) media; committed with
    /// the sentinel so it is never fetched again.
    NoMedia,
    /// Recognized media of a kind mirroring is disabled for; no side
    /// effects, so enabling the kind later picks the submission up.
    KindDisabled,
    /// Replied and recorded.
    Committed(StatusId),
    /// Aborted mid-processing; nothing recorded, retried on the next scan.
    Failed(PipelineError),
}

/// Tally for one scan cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct Pipeline {
    forum: Arc<dyn ForumClient>,
    social: Arc<dyn SocialClient>,
    images: Arc<dyn ImageHost>,
    videos: Arc<dyn VideoHost>,
    ledger: Arc<dyn VisitLedger>,
    /// Redirect-disabled client for short-link resolution.
    http: reqwest::Client,
    flags: MirrorFlags,
}

impl Pipeline {
    pub fn new(
        forum: Arc<dyn ForumClient>,
        social: Arc<dyn SocialClient>,
        images: Arc<dyn ImageHost>,
        videos: Arc<dyn VideoHost>,
        ledger: Arc<dyn VisitLedger>,
        flags: MirrorFlags,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            forum,
            social,
            images,
            videos,
            ledger,
            http: matcher::redirect_client()?,
            flags,
        })
    }

    /// Drain one listing of `multi`, handling each submission independently
    /// and in listing order.
    pub async fn scan(&self, multi: &str, exclude: &HashSet<String>) -> ScanSummary {
        let submissions = match self.forum.new_submissions(multi).await {
            Ok(submissions) => submissions,
            Err(err) => {
                tracing::error!(multi, error = %err, "failed to list new submissions");
                return ScanSummary::default();
            }
        };

        let mut summary = ScanSummary::default();
        for submission in &submissions {
            let outcome = self.process(submission, exclude).await;
            report(submission, &outcome);
            match outcome {
                Outcome::Committed(_) => summary.processed += 1,
                Outcome::Failed(_) => summary.failed += 1,
                _ => summary.skipped += 1,
            }
        }
        summary
    }

    /// Run one submission to a terminal state. Never returns an error; a
    /// failure becomes `Outcome::Failed` and the caller moves on.
    pub async fn process(&self, submission: &Submission, exclude: &HashSet<String>) -> Outcome {
        if exclude.contains(&submission.subreddit.to_lowercase()) {
            return Outcome::FilteredOut;
        }
        match self.process_inner(submission).await {
            Ok(outcome) => outcome,
            Err(err) => Outcome::Failed(err),
        }
    }

    async fn process_inner(&self, submission: &Submission) -> Result<Outcome, PipelineError> {
        // Ledger first: it gates all network-expensive work. The URL match
        // comes second because short-link resolution may itself fetch.
        if self.ledger.has_visited(&submission.id).await? {
            return Ok(Outcome::DedupSkipped);
        }

        let Some(status_id) = matcher::resolve_status_id(&self.http, &submission.url).await?
        else {
            return Ok(Outcome::FilteredOut);
        };

        // The comment scan is the source of truth for "did we reply": it
        // catches a previous run that replied but died before the ledger
        // write. A failed scan defensively counts as "no reply found".
        let authors = match self.forum.comment_authors(&submission.id).await {
            Ok(authors) => authors,
            Err(err) => {
                tracing::warn!(
                    submission = %submission.id,
                    error = %err,
                    "comment scan failed, assuming no earlier reply"
                );
                Vec::new()
            }
        };
        let bot = self.forum.bot_username();
        if authors.iter().any(|author| author.eq_ignore_ascii_case(bot)) {
            self.ledger
                .mark_visited(&submission.id, &ledger::record_value(&status_id))
                .await?;
            return Ok(Outcome::AlreadyReplied);
        }

        let post = self.social.get_post(&status_id).await?;
        let (kind, enabled) = match media::classify(&post) {
            MediaClass::Unclassified => {
                self.ledger
                    .mark_visited(&submission.id, ledger::NO_REPLY_SENTINEL)
                    .await?;
                return Ok(Outcome::NoMedia);
            }
            MediaClass::Photo => (MediaKind::Photo, self.flags.photos),
            MediaClass::Animated => (MediaKind::Animated, self.flags.animated),
            MediaClass::Video => (MediaKind::Video, self.flags.videos),
        };
        if !enabled {
            return Ok(Outcome::KindDisabled);
        }

        let mirrors = self.upload_all(&post, kind).await?;
        if mirrors.urls.is_empty() {
            // Classified, but nothing eligible (e.g. no mp4 variant).
            self.ledger
                .mark_visited(&submission.id, ledger::NO_REPLY_SENTINEL)
                .await?;
            return Ok(Outcome::NoMedia);
        }

        let body = compose::compose(&self.http, &post, &mirrors).await;
        self.forum.post_reply(&submission.id, &body).await?;
        self.ledger
            .mark_visited(&submission.id, &ledger::record_value(&status_id))
            .await?;
        Ok(Outcome::Committed(status_id))
    }

    /// Upload every extracted source URL for `kind`, aborting on the first
    /// failure so a reply never ships with missing mirrors.
    async fn upload_all(
        &self,
        post: &SourcePost,
        kind: MediaKind,
    ) -> Result<MirrorResult, UploadError> {
        let mut urls = Vec::new();
        match kind {
            MediaKind::Photo => {
                let title = mirror::photo_title(&post.author_name);
                for source in media::extract_photos(post) {
                    urls.push(
                        self.images
                            .upload_image(&source, &title, mirror::MIRROR_DESCRIPTION)
                            .await?,
                    );
                }
            }
            MediaKind::Animated | MediaKind::Video => {
                let title = mirror::video_title(&post.author_name);
                let sources = if kind == MediaKind::Video {
                    media::extract_video_variants(post)
                } else {
                    media::extract_animated_variants(post)
                };
                for source in sources {
                    urls.push(self.videos.upload_video(&source, &title).await?);
                }
            }
        }
        Ok(MirrorResult { kind, urls })
    }
}

/// One structured event plus one human-readable stdout line per terminal
/// outcome.
fn report(submission: &Submission, outcome: &Outcome) {
    let id = &submission.id;
    let sub = &submission.subreddit;
    let line = match outcome {
        Outcome::Committed(status_id) => {
            tracing::info!(submission = %id, subreddit = %sub, status = %status_id, "processed submission");
            format!("processed submission {id} on /r/{sub}.")
        }
        Outcome::DedupSkipped => {
            tracing::info!(submission = %id, subreddit = %sub, "already processed, skipping");
            format!("submission {id} in /r/{sub} already processed, skipping...")
        }
        Outcome::AlreadyReplied => {
            tracing::info!(submission = %id, subreddit = %sub, "reply found, skipping");
            format!("reply found in submission {id} in /r/{sub}, skipping...")
        }
        Outcome::FilteredOut => {
            tracing::debug!(submission = %id, subreddit = %sub, "filtered out");
            format!("submission {id} in /r/{sub} filtered out, skipping...")
        }
        Outcome::NoMedia => {
            tracing::info!(submission = %id, subreddit = %sub, "no media, skipping");
            format!("no media found in submission {id} in /r/{sub}, skipping...")
        }
        Outcome::KindDisabled => {
            tracing::info!(submission = %id, subreddit = %sub, "media kind disabled, skipping");
            format!("media kind disabled for submission {id} in /r/{sub}, skipping...")
        }
        Outcome::Failed(err) => {
            tracing::error!(submission = %id, subreddit = %sub, error = %err, "failed to process submission");
            format!("failed to process submission {id} in /r/{sub}: {err}")
        }
    };
    println!("{line}");
}
