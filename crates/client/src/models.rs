use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub id: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub category: String,
    pub status: String,
    pub upvotes: i32,
    pub created_at: DateTime<Utc>,
    pub user_has_voted: bool,
}

#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub category: String,
}
