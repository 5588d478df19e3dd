//! Persistence port for the `feedback` and `votes` tables.

mod memory;
mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Feedback, NewFeedback};

pub use memory::MemoryFeedbackStore;
pub use postgres::PgFeedbackStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The (feedback_id, voter_hash) pair already has a vote.
    #[error("vote already recorded for this voter")]
    DuplicateVote,

    /// A vote referenced a feedback row that does not exist.
    #[error("feedback item does not exist")]
    UnknownFeedback,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Items whose status is not closed, most upvoted first, newest first on
    /// ties.
    async fn list_open(&self, limit: i64) -> Result<Vec<Feedback>, StoreError>;

    /// The subset of `ids` that `voter_hash` has voted on.
    async fn voted_ids(&self, voter_hash: &str, ids: &[Uuid])
    -> Result<HashSet<Uuid>, StoreError>;

    async fn get_feedback(&self, id: Uuid) -> Result<Option<Feedback>, StoreError>;

    async fn insert_feedback(&self, new: &NewFeedback) -> Result<Feedback, StoreError>;

    /// Records a vote. The store bumps the item's `upvotes` on success.
    async fn insert_vote(&self, feedback_id: Uuid, voter_hash: &str) -> Result<(), StoreError>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), StoreError>;
}
