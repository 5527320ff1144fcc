//! Route definitions for the `/questions` resource.
//!
//! Reads are public; writes require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{answer, comment, question, vote};
use crate::state::AppState;

/// Routes mounted at `/questions`.
///
/// ```text
/// GET    /                  -> list_questions
/// POST   /                  -> create_question
/// GET    /{id}              -> get_question
/// GET    /{id}/answers      -> list_answers
/// POST   /{id}/answers      -> create_answer
/// POST   /{id}/comments     -> comment_on_question
/// POST   /{id}/vote         -> vote_question
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(question::list_questions).post(question::create_question),
        )
        .route("/{id}", get(question::get_question))
        .route(
            "/{id}/answers",
            get(question::list_answers).post(answer::create_answer),
        )
        .route("/{id}/comments", post(comment::comment_on_question))
        .route("/{id}/vote", post(vote::vote_question))
}
