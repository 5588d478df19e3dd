use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{FeedbackStore, StoreError};
use crate::models::{Feedback, NewFeedback, STATUS_CLOSED, STATUS_OPEN};

#[derive(Default)]
struct Tables {
    feedback: HashMap<Uuid, Feedback>,
    votes: HashSet<(Uuid, String)>,
}

/// In-process stand-in for the Postgres tables. Mirrors the constraints the
/// database enforces: unique votes, vote foreign key, upvote counter.
#[derive(Default)]
pub struct MemoryFeedbackStore {
    tables: Mutex<Tables>,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed row, bypassing defaults. Lets callers stage
    /// closed items or specific vote counts.
    pub fn insert_row(&self, row: Feedback) {
        self.lock().feedback.insert(row.id, row);
    }

    pub fn vote_count(&self) -> usize {
        self.lock().votes.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // Every write completes under a single guard, so poisoned data is still whole.
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl FeedbackStore for MemoryFeedbackStore {
    async fn list_open(&self, limit: i64) -> Result<Vec<Feedback>, StoreError> {
        let tables = self.lock();
        let mut rows: Vec<Feedback> = tables
            .feedback
            .values()
            .filter(|f| f.status != STATUS_CLOSED)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.upvotes
                .cmp(&a.upvotes)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn voted_ids(
        &self,
        voter_hash: &str,
        ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError> {
        let tables = self.lock();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| tables.votes.contains(&(*id, voter_hash.to_string())))
            .collect())
    }

    async fn get_feedback(&self, id: Uuid) -> Result<Option<Feedback>, StoreError> {
        Ok(self.lock().feedback.get(&id).cloned())
    }

    async fn insert_feedback(&self, new: &NewFeedback) -> Result<Feedback, StoreError> {
        let row = Feedback {
            id: Uuid::new_v4(),
            title: new.title.clone(),
            body: new.body.clone(),
            category: new.category.as_str().to_string(),
            status: STATUS_OPEN.to_string(),
            upvotes: 0,
            created_at: Utc::now(),
        };
        self.lock().feedback.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_vote(&self, feedback_id: Uuid, voter_hash: &str) -> Result<(), StoreError> {
        let mut tables = self.lock();
        if !tables.feedback.contains_key(&feedback_id) {
            return Err(StoreError::UnknownFeedback);
        }
        if !tables.votes.insert((feedback_id, voter_hash.to_string())) {
            return Err(StoreError::DuplicateVote);
        }
        if let Some(row) = tables.feedback.get_mut(&feedback_id) {
            row.upvotes += 1;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
