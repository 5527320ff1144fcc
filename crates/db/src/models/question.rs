//! Question entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stackit_core::types::{DbId, Timestamp};

/// A row from the `questions` table with its tag names attached.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: DbId,
    pub title: String,
    pub body: String,
    pub author_id: DbId,
    pub tags: Vec<String>,
    pub vote_count: i32,
    pub view_count: i32,
    pub accepted_answer_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a question. Tags must already be normalized.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestion {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A tag name and how many questions carry it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TagCount {
    pub name: String,
    pub question_count: i64,
}
