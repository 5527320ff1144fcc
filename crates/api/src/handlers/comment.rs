//! Handlers for comments on questions and answers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use stackit_core::content::{validate_body, ContentEvent, ItemRef};
use stackit_core::error::CoreError;
use stackit_core::types::DbId;
use stackit_db::models::comment::{Comment, CreateComment};
use stackit_db::repositories::{AnswerRepo, CommentRepo, QuestionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::answer::answer_not_found;
use crate::handlers::question::question_not_found;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/questions/{id}/comments
pub async fn comment_on_question(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    if QuestionRepo::find_author_id(&state.pool, question_id)
        .await?
        .is_none()
    {
        return Err(question_not_found(question_id));
    }
    post_comment(auth, state, question_id, ItemRef::Question(question_id), input).await
}

/// POST /api/v1/answers/{id}/comments
pub async fn comment_on_answer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(answer_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    let answer = AnswerRepo::find_by_id(&state.pool, answer_id)
        .await?
        .ok_or_else(|| answer_not_found(answer_id))?;
    post_comment(auth, state, answer.question_id, ItemRef::Answer(answer_id), input).await
}

/// Insert the comment and queue the fan-out for the commented item's author.
async fn post_comment(
    auth: AuthUser,
    state: AppState,
    question_id: DbId,
    target: ItemRef,
    input: CreateComment,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    validate_body(&input.body).map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let comment = CommentRepo::create(&state.pool, target, auth.user_id, &input.body).await?;
    tracing::info!(
        comment_id = comment.id,
        target = target.kind().as_str(),
        target_id = target.id(),
        "Comment posted"
    );

    state
        .notifications
        .queue
        .enqueue(ContentEvent::ItemCommented {
            actor_id: auth.user_id,
            question_id,
            target,
            comment_id: comment.id,
            body: comment.body.clone(),
        })
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}
