//! Visit ledger: which submissions have already been handled.
//!
//! Backed by Redis in production. The ledger is an optimization to skip
//! re-fetching; the comment scan in the pipeline is the actual source of
//! truth for "did we already reply", so plain read-then-write access with no
//! transaction is acceptable here.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::matcher::StatusId;

/// Ledger value for submissions committed without a reply (no recognized
/// media on the tweet). Keeps the pipeline from re-fetching such posts on
/// every scan.
pub const NO_REPLY_SENTINEL: &str = "none";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger store error: {0}")]
    Store(#[from] redis::RedisError),
}

/// Record of handled submissions. Keys are submission ids; values are the
/// tweet status id that produced the reply, or [`NO_REPLY_SENTINEL`].
#[async_trait]
pub trait VisitLedger: Send + Sync {
    /// Plain existence check.
    async fn has_visited(&self, submission_id: &str) -> Result<bool, LedgerError>;

    /// Unconditional upsert, last write wins. Records are never deleted by
    /// the bot; retention is the store's concern.
    async fn mark_visited(&self, submission_id: &str, value: &str) -> Result<(), LedgerError>;
}

/// Ledger value for a submission that produced a reply.
pub fn record_value(status_id: &StatusId) -> String {
    status_id.as_str().to_string()
}

/// Redis-backed ledger.
pub struct RedisLedger {
    conn: ConnectionManager,
}

impl RedisLedger {
    pub async fn connect(url: &str) -> Result<Self, LedgerError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl VisitLedger for RedisLedger {
    async fn has_visited(&self, submission_id: &str) -> Result<bool, LedgerError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(submission_id).await?;
        Ok(exists)
    }

    async fn mark_visited(&self, submission_id: &str, value: &str) -> Result<(), LedgerError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(submission_id, value).await?;
        Ok(())
    }
}

/// In-memory ledger for tests.
#[derive(Default)]
pub struct MemoryLedger {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored value for a submission, if any.
    pub async fn get(&self, submission_id: &str) -> Option<String> {
        self.entries.read().await.get(submission_id).cloned()
    }
}

#[async_trait]
impl VisitLedger for MemoryLedger {
    async fn has_visited(&self, submission_id: &str) -> Result<bool, LedgerError> {
        Ok(self.entries.read().await.contains_key(submission_id))
    }

    async fn mark_visited(&self, submission_id: &str, value: &str) -> Result<(), LedgerError> {
        self.entries
            .write()
            .await
            .insert(submission_id.to_string(), value.to_string());
        Ok(())
    }
}
