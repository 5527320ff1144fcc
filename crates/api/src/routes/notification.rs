//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require authentication.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{notification, preference};
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                  -> list_notifications
/// GET    /unread-count      -> unread_count
/// GET    /stats             -> stats
/// PUT    /read              -> mark_many_read
/// POST   /read-all          -> mark_all_read
/// POST   /mention           -> create_mention
/// GET    /preferences       -> get_preferences
/// PUT    /preferences       -> update_preferences
/// DELETE /{id}              -> delete_notification
/// POST   /{id}/read         -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/unread-count", get(notification::unread_count))
        .route("/stats", get(notification::stats))
        .route("/read", put(notification::mark_many_read))
        .route("/read-all", post(notification::mark_all_read))
        .route("/mention", post(notification::create_mention))
        .route(
            "/preferences",
            get(preference::get_preferences).put(preference::update_preferences),
        )
        .route("/{id}", delete(notification::delete_notification))
        .route("/{id}/read", post(notification::mark_read))
}
