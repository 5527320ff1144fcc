//! Repository for the `comments` table.

use sqlx::PgPool;
use stackit_core::content::ItemRef;
use stackit_core::types::DbId;

use crate::models::comment::Comment;

/// Column list shared across queries.
const COLUMNS: &str = "id, question_id, answer_id, author_id, body, created_at";

/// Provides create/list operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a comment on a question or an answer.
    pub async fn create(
        pool: &PgPool,
        target: ItemRef,
        author_id: DbId,
        body: &str,
    ) -> Result<Comment, sqlx::Error> {
        let (question_id, answer_id) = match target {
            ItemRef::Question(id) => (Some(id), None),
            ItemRef::Answer(id) => (None, Some(id)),
        };
        let query = format!(
            "INSERT INTO comments (question_id, answer_id, author_id, body)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(question_id)
            .bind(answer_id)
            .bind(author_id)
            .bind(body)
            .fetch_one(pool)
            .await
    }

    /// List the comments on a question or an answer, oldest first.
    pub async fn list_for_item(pool: &PgPool, target: ItemRef) -> Result<Vec<Comment>, sqlx::Error> {
        let column = match target {
            ItemRef::Question(_) => "question_id",
            ItemRef::Answer(_) => "answer_id",
        };
        let query = format!(
            "SELECT {COLUMNS} FROM comments WHERE {column} = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(target.id())
            .fetch_all(pool)
            .await
    }
}
