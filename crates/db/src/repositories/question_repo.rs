//! Repository for the `questions`, `tags` and `question_tags` tables.

use sqlx::PgPool;
use stackit_core::content::QuestionSort;
use stackit_core::types::DbId;

use crate::models::question::{CreateQuestion, Question, TagCount};

/// Question columns with the tag names aggregated into a `TEXT[]`.
const SELECT_QUESTION: &str = "SELECT q.id, q.title, q.body, q.author_id, \
        COALESCE((SELECT array_agg(t.name ORDER BY t.name) \
                  FROM question_tags qt JOIN tags t ON t.id = qt.tag_id \
                  WHERE qt.question_id = q.id), '{}'::text[]) AS tags, \
        q.vote_count, q.view_count, q.accepted_answer_id, q.created_at, q.updated_at \
    FROM questions q";

/// Provides CRUD operations for questions.
pub struct QuestionRepo;

impl QuestionRepo {
    /// Insert a question and link its tags, creating unknown tags on the fly.
    ///
    /// Runs in a single transaction so a question never exists without its
    /// tag links.
    pub async fn create(
        pool: &PgPool,
        author_id: DbId,
        input: &CreateQuestion,
    ) -> Result<Question, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let question_id: DbId = sqlx::query_scalar(
            "INSERT INTO questions (title, body, author_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&input.title)
        .bind(&input.body)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await?;

        for tag in &input.tags {
            let tag_id: DbId = sqlx::query_scalar(
                "INSERT INTO tags (name) VALUES ($1) \
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
                 RETURNING id",
            )
            .bind(tag)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO question_tags (question_id, tag_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(question_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!("{SELECT_QUESTION} WHERE q.id = $1");
        let question = sqlx::query_as::<_, Question>(&query)
            .bind(question_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(question)
    }

    /// Find a question by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Question>, sqlx::Error> {
        let query = format!("{SELECT_QUESTION} WHERE q.id = $1");
        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List questions in `sort` order, optionally restricted to one tag.
    pub async fn list(
        pool: &PgPool,
        tag: Option<&str>,
        sort: QuestionSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "{SELECT_QUESTION} \
             WHERE $1::text IS NULL OR EXISTS ( \
                SELECT 1 FROM question_tags qt JOIN tags t ON t.id = qt.tag_id \
                WHERE qt.question_id = q.id AND t.name = $1) \
             ORDER BY {} \
             LIMIT $2 OFFSET $3",
            order_clause(sort)
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(tag)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring search over title, body and tag names,
    /// newest first.
    pub async fn search(
        pool: &PgPool,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "{SELECT_QUESTION} \
             WHERE q.title ILIKE $1 OR q.body ILIKE $1 OR EXISTS ( \
                SELECT 1 FROM question_tags qt JOIN tags t ON t.id = qt.tag_id \
                WHERE qt.question_id = q.id AND t.name ILIKE $1) \
             ORDER BY q.created_at DESC, q.id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(format!("%{}%", escape_like(term)))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every tag in use with its question count, most used first.
    pub async fn tag_counts(pool: &PgPool) -> Result<Vec<TagCount>, sqlx::Error> {
        sqlx::query_as::<_, TagCount>(
            "SELECT t.name, COUNT(qt.question_id) AS question_count \
             FROM tags t JOIN question_tags qt ON qt.tag_id = t.id \
             GROUP BY t.name \
             ORDER BY question_count DESC, t.name ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Increment the view counter. Returns `false` if the question does not exist.
    pub async fn increment_views(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE questions SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Return the author of a question.
    pub async fn find_author_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT author_id FROM questions WHERE id = $1")
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
            "UPDATE questions SET vote_count = vote_count + $2, updated_at = NOW() \
             WHERE id = $1 RETURNING vote_count",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(pool)
        .await
    }
}

fn order_clause(sort: QuestionSort) -> &'static str {
    match sort {
        QuestionSort::Newest => "q.created_at DESC, q.id DESC",
        QuestionSort::Votes => "q.vote_count DESC, q.created_at DESC, q.id DESC",
        QuestionSort::Answers => {
            "(SELECT COUNT(*) FROM answers a WHERE a.question_id = q.id) DESC, \
             q.created_at DESC, q.id DESC"
        }
        QuestionSort::Views => "q.view_count DESC, q.created_at DESC, q.id DESC",
    }
}

/// Escape `LIKE` wildcards so `term` matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
