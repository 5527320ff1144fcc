//! Route definitions for the `/answers` resource. All endpoints require
//! authentication.

use axum::routing::post;
use axum::Router;

use crate::handlers::{answer, comment, vote};
use crate::state::AppState;

/// Routes mounted at `/answers`.
///
/// ```text
/// POST   /{id}/accept       -> accept_answer
/// POST   /{id}/comments     -> comment_on_answer
/// POST   /{id}/vote         -> vote_answer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/accept", post(answer::accept_answer))
        .route("/{id}/comments", post(comment::comment_on_answer))
        .route("/{id}/vote", post(vote::vote_answer))
}
