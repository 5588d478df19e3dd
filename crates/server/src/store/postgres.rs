use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;
use uuid::Uuid;

use super::{FeedbackStore, StoreError};
use crate::models::{Feedback, NewFeedback};

const FEEDBACK_COLUMNS: &str = "id, title, body, category, status, upvotes, created_at";

#[derive(Clone)]
pub struct PgFeedbackStore {
    db: PgPool,
}

impl PgFeedbackStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("Connected to database (pool size {})", max_connections);
        Ok(Self::new(db))
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

fn map_vote_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::DuplicateVote,
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            StoreError::UnknownFeedback
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl FeedbackStore for PgFeedbackStore {
    async fn list_open(&self, limit: i64) -> Result<Vec<Feedback>, StoreError> {
        let rows = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback
             WHERE status IS DISTINCT FROM 'closed'
             ORDER BY upvotes DESC, created_at DESC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn voted_ids(
        &self,
        voter_hash: &str,
        ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let voted: Vec<Uuid> = sqlx::query_scalar(
            "SELECT feedback_id FROM votes
             WHERE voter_hash = $1 AND feedback_id = ANY($2)",
        )
        .bind(voter_hash)
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(voted.into_iter().collect())
    }

    async fn get_feedback(&self, id: Uuid) -> Result<Option<Feedback>, StoreError> {
        let row = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn insert_feedback(&self, new: &NewFeedback) -> Result<Feedback, StoreError> {
        let row = sqlx::query_as::<_, Feedback>(&format!(
            "INSERT INTO feedback (title, body, category)
             VALUES ($1, $2, $3)
             RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(&new.title)
        .bind(&new.body)
        .bind(new.category.as_str())
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    async fn insert_vote(&self, feedback_id: Uuid, voter_hash: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO votes (feedback_id, voter_hash) VALUES ($1, $2)")
            .bind(feedback_id)
            .bind(voter_hash)
            .execute(&self.db)
            .await
            .map_err(map_vote_error)?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
