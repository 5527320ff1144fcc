//! Handlers for the `/questions` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use stackit_core::content::{
    normalize_tags, validate_body, validate_title, ContentEvent, QuestionSort,
};
use stackit_core::error::CoreError;
use stackit_core::mentions::extract_mentions;
use stackit_core::types::DbId;
use stackit_db::models::answer::Answer;
use stackit_db::models::question::{CreateQuestion, Question, TagCount};
use stackit_db::repositories::{AnswerRepo, QuestionRepo};
use stackit_db::{clamp_limit, clamp_offset};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for question listing.
const DEFAULT_LIMIT: i64 = 20;

/// Maximum page size for question listing.
const MAX_LIMIT: i64 = 100;

/// Query parameters for `GET /questions`.
#[derive(Debug, Deserialize)]
pub struct QuestionListQuery {
    pub tag: Option<String>,
    /// `newest` (default), `votes`, `answers` or `views`.
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/questions
///
/// Create a question. Users mentioned in the body are notified.
pub async fn create_question(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateQuestion>,
) -> AppResult<(StatusCode, Json<DataResponse<Question>>)> {
    validate_title(&input.title).map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    validate_body(&input.body).map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    let tags = normalize_tags(&input.tags).map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let input = CreateQuestion {
        title: input.title.trim().to_string(),
        body: input.body,
        tags,
    };
    let question = QuestionRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(question_id = question.id, author_id = auth.user_id, "Question created");

    if !extract_mentions(&question.body).is_empty() {
        state
            .notifications
            .queue
            .enqueue(ContentEvent::UserMentioned {
                actor_id: auth.user_id,
                mentioned_user_id: None,
                question_id: question.id,
                answer_id: None,
                comment_id: None,
                body: question.body.clone(),
            })
            .await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: question })))
}

/// GET /api/v1/questions
///
/// Questions in the requested order (newest first by default), optionally
/// filtered by tag.
pub async fn list_questions(
    State(state): State<AppState>,
    Query(params): Query<QuestionListQuery>,
) -> AppResult<Json<DataResponse<Vec<Question>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let tag = params.tag.map(|t| t.trim().to_lowercase());
    let sort = match params.sort.as_deref() {
        Some(value) => {
            QuestionSort::parse(value).map_err(|e| AppError::Core(CoreError::Validation(e)))?
        }
        None => QuestionSort::default(),
    };

    let questions = QuestionRepo::list(&state.pool, tag.as_deref(), sort, limit, offset).await?;
    Ok(Json(DataResponse { data: questions }))
}

/// GET /api/v1/search?q=
///
/// Case-insensitive match on title, body or tag. A missing or blank term
/// returns an empty list.
pub async fn search_questions(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<DataResponse<Vec<Question>>>> {
    let term = params.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Ok(Json(DataResponse { data: Vec::new() }));
    }

    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let questions = QuestionRepo::search(&state.pool, term, limit, offset).await?;
    Ok(Json(DataResponse { data: questions }))
}

/// GET /api/v1/tags
///
/// Tags in use with their question counts, most used first.
pub async fn list_tags(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<TagCount>>>> {
    let tags = QuestionRepo::tag_counts(&state.pool).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// GET /api/v1/questions/{id}
///
/// Fetch a question and count the view.
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Question>>> {
    if !QuestionRepo::increment_views(&state.pool, id).await? {
        return Err(question_not_found(id));
    }
    let question = QuestionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| question_not_found(id))?;
    Ok(Json(DataResponse { data: question }))
}

/// GET /api/v1/questions/{id}/answers
pub async fn list_answers(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Answer>>>> {
    if QuestionRepo::find_author_id(&state.pool, id).await?.is_none() {
        return Err(question_not_found(id));
    }
    let answers = AnswerRepo::list_for_question(&state.pool, id).await?;
    Ok(Json(DataResponse { data: answers }))
}

pub(crate) fn question_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Question",
        id,
    })
}
