//! Repository for the `answers` table.

use sqlx::PgPool;
use stackit_core::types::DbId;

use crate::models::answer::Answer;

/// Column list shared across queries.
const COLUMNS: &str =
    "id, question_id, author_id, body, vote_count, is_accepted, created_at, updated_at";

/// Provides CRUD operations for answers.
pub struct AnswerRepo;

impl AnswerRepo {
    /// Insert an answer on a question, returning the created row.
    pub async fn create(
        pool: &PgPool,
        question_id: DbId,
        author_id: DbId,
        body: &str,
    ) -> Result<Answer, sqlx::Error> {
        let query = format!(
            "INSERT INTO answers (question_id, author_id, body)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Answer>(&query)
            .bind(question_id)
            .bind(author_id)
            .bind(body)
            .fetch_one(pool)
            .await
    }

    /// Find an answer by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Answer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM answers WHERE id = $1");
        sqlx::query_as::<_, Answer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a question's answers: accepted first, then by votes, then oldest first.
    pub async fn list_for_question(
        pool: &PgPool,
        question_id: DbId,
    ) -> Result<Vec<Answer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM answers WHERE question_id = $1 \
             ORDER BY is_accepted DESC, vote_count DESC, created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Answer>(&query)
            .bind(question_id)
            .fetch_all(pool)
            .await
    }

    /// Return the author of an answer.
    pub async fn find_author_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT author_id FROM answers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Add `delta` to the vote count, returning the new count.
    pub async fn apply_vote(
        pool: &PgPool,
        id: DbId,
        delta: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE answers SET vote_count = vote_count + $2, updated_at = NOW() \
             WHERE id = $1 RETURNING vote_count",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(pool)
        .await
    }

    /// Mark an answer as the accepted one for its question.
    ///
    /// Unsets every sibling first, then sets the target and records it on
    /// the question, all in one transaction. Returns `None` if the answer
    /// does not exist.
    pub async fn accept(pool: &PgPool, id: DbId) -> Result<Option<Answer>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let question_id: Option<DbId> =
            sqlx::query_scalar("SELECT question_id FROM answers WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(question_id) = question_id else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE answers SET is_accepted = false, updated_at = NOW() \
             WHERE question_id = $1 AND id <> $2 AND is_accepted",
        )
        .bind(question_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE answers SET is_accepted = true, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let answer = sqlx::query_as::<_, Answer>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE questions SET accepted_answer_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(question_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(answer))
    }
}
