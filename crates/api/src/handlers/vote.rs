//! Handlers for voting on questions and answers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use stackit_core::content::{ContentEvent, ItemRef, VoteDirection};
use stackit_core::types::DbId;
use stackit_db::repositories::{AnswerRepo, QuestionRepo};

use crate::error::AppResult;
use crate::handlers::answer::answer_not_found;
use crate::handlers::question::question_not_found;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the vote endpoints.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

/// Vote result returned to the caller.
#[derive(Debug, Serialize)]
pub struct VoteResult {
    pub target: ItemRef,
    pub vote_count: i32,
}

/// POST /api/v1/questions/{id}/vote
pub async fn vote_question(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<DbId>,
    Json(input): Json<VoteRequest>,
) -> AppResult<Json<DataResponse<VoteResult>>> {
    let vote_count = QuestionRepo::apply_vote(&state.pool, question_id, input.direction.delta())
        .await?
        .ok_or_else(|| question_not_found(question_id))?;

    record_vote(&auth, &state, question_id, ItemRef::Question(question_id), input.direction).await;

    Ok(Json(DataResponse {
        data: VoteResult {
            target: ItemRef::Question(question_id),
            vote_count,
        },
    }))
}

/// POST /api/v1/answers/{id}/vote
pub async fn vote_answer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(answer_id): Path<DbId>,
    Json(input): Json<VoteRequest>,
) -> AppResult<Json<DataResponse<VoteResult>>> {
    let answer = AnswerRepo::find_by_id(&state.pool, answer_id)
        .await?
        .ok_or_else(|| answer_not_found(answer_id))?;

    let vote_count = AnswerRepo::apply_vote(&state.pool, answer_id, input.direction.delta())
        .await?
        .ok_or_else(|| answer_not_found(answer_id))?;

    record_vote(&auth, &state, answer.question_id, ItemRef::Answer(answer_id), input.direction).await;

    Ok(Json(DataResponse {
        data: VoteResult {
            target: ItemRef::Answer(answer_id),
            vote_count,
        },
    }))
}

async fn record_vote(
    auth: &AuthUser,
    state: &AppState,
    question_id: DbId,
    target: ItemRef,
    direction: VoteDirection,
) {
    tracing::info!(
        voter_id = auth.user_id,
        target = target.kind().as_str(),
        target_id = target.id(),
        ?direction,
        "Vote recorded"
    );
    state
        .notifications
        .queue
        .enqueue(ContentEvent::ItemVoted {
            actor_id: auth.user_id,
            question_id,
            target,
            direction,
        })
        .await;
}
