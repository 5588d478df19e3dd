use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status tag that hides an item from listings.
pub const STATUS_CLOSED: &str = "closed";

/// Status given to new items by the store.
pub const STATUS_OPEN: &str = "open";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub category: String,
    pub status: String,
    pub upvotes: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bug,
    Idea,
    Ux,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Bug, Category::Idea, Category::Ux];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Bug => "bug",
            Category::Idea => "idea",
            Category::Ux => "ux",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or(())
    }
}

/// A validated submission, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub title: String,
    pub body: Option<String>,
    pub category: Category,
}

/// Raw `POST /feedback` payload. Every field is optional so missing fields
/// are reported by validation rather than by the JSON extractor.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitFeedback {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
}

/// A feedback row as seen by one caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub user_has_voted: bool,
}

impl FeedbackItem {
    pub fn new(feedback: Feedback, user_has_voted: bool) -> Self {
        Self {
            feedback,
            user_has_voted,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}
