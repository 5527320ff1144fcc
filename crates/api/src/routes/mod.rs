pub mod answer;
pub mod health;
pub mod notification;
pub mod question;

use axum::routing::get;
use axum::Router;

use crate::handlers::question::{list_tags, search_questions};
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                   WebSocket (?token=<jwt>)
/// /search                               question search (?q=)
/// /tags                                 tags with question counts
///
/// /questions                            list (?tag=&sort=), create
/// /questions/{id}                       get (counts a view)
/// /questions/{id}/answers               list, create
/// /questions/{id}/comments              create
/// /questions/{id}/vote                  vote (POST)
///
/// /answers/{id}/accept                  accept (POST, question author only)
/// /answers/{id}/comments                create
/// /answers/{id}/vote                    vote (POST)
///
/// /notifications                        list
/// /notifications/unread-count           cached unread count
/// /notifications/stats                  aggregate counts
/// /notifications/read                   mark listed or all read (PUT)
/// /notifications/read-all               mark all read (POST)
/// /notifications/mention                explicit mention (POST)
/// /notifications/preferences            get, replace
/// /notifications/{id}                   delete
/// /notifications/{id}/read              mark one read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/search", get(search_questions))
        .route("/tags", get(list_tags))
        .nest("/questions", question::router())
        .nest("/answers", answer::router())
        .nest("/notifications", notification::router())
}
