//! Comment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stackit_core::types::{DbId, Timestamp};

/// A row from the `comments` table.
///
/// Exactly one of `question_id` / `answer_id` is set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub question_id: Option<DbId>,
    pub answer_id: Option<DbId>,
    pub author_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

/// DTO for posting a comment; the parent comes from the URL.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub body: String,
}
