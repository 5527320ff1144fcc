//! Handlers for answers: posting and accepting.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use stackit_core::content::{validate_body, ContentEvent};
use stackit_core::error::CoreError;
use stackit_core::types::DbId;
use stackit_db::models::answer::{Answer, CreateAnswer};
use stackit_db::repositories::{AnswerRepo, QuestionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::question::question_not_found;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/questions/{id}/answers
///
/// Post an answer. The question's author and any users mentioned in the
/// body are notified.
pub async fn create_answer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<DbId>,
    Json(input): Json<CreateAnswer>,
) -> AppResult<(StatusCode, Json<DataResponse<Answer>>)> {
    validate_body(&input.body).map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    if QuestionRepo::find_author_id(&state.pool, question_id)
        .await?
        .is_none()
    {
        return Err(question_not_found(question_id));
    }

    let answer = AnswerRepo::create(&state.pool, question_id, auth.user_id, &input.body).await?;
    tracing::info!(answer_id = answer.id, question_id, author_id = auth.user_id, "Answer posted");

    state
        .notifications
        .queue
        .enqueue(ContentEvent::QuestionAnswered {
            actor_id: auth.user_id,
            question_id,
            answer_id: answer.id,
            body: answer.body.clone(),
        })
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: answer })))
}

/// POST /api/v1/answers/{id}/accept
///
/// Mark an answer as accepted. Only the question's author may do this; any
/// previously accepted answer on the same question is unaccepted.
pub async fn accept_answer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(answer_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Answer>>> {
    let answer = AnswerRepo::find_by_id(&state.pool, answer_id)
        .await?
        .ok_or_else(|| answer_not_found(answer_id))?;

    let question_author = QuestionRepo::find_author_id(&state.pool, answer.question_id)
        .await?
        .ok_or_else(|| question_not_found(answer.question_id))?;

    if question_author != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the question author can accept an answer".into(),
        )));
    }

    let accepted = AnswerRepo::accept(&state.pool, answer_id)
        .await?
        .ok_or_else(|| answer_not_found(answer_id))?;
    tracing::info!(answer_id, question_id = accepted.question_id, "Answer accepted");

    Ok(Json(DataResponse { data: accepted }))
}

pub(crate) fn answer_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Answer",
        id,
    })
}
