//! Answer entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stackit_core::types::{DbId, Timestamp};

/// A row from the `answers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Answer {
    pub id: DbId,
    pub question_id: DbId,
    pub author_id: DbId,
    pub body: String,
    pub vote_count: i32,
    pub is_accepted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for posting an answer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnswer {
    pub body: String,
}
