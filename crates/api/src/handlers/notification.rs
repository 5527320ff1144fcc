//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`] and only ever
//! touch the caller's own notifications.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stackit_core::content::ContentEvent;
use stackit_core::error::CoreError;
use stackit_core::notification::validate_notification_type;
use stackit_core::types::DbId;
use stackit_db::repositories::QuestionRepo;
use stackit_db::{clamp_limit, clamp_offset};
use stackit_events::store::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use stackit_events::NotificationFilter;

use crate::error::{AppError, AppResult};
use crate::handlers::question::question_not_found;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    /// Restrict to one category (`answer`, `comment`, `mention`, `vote`).
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    /// Maximum number of results. Defaults to 20, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Body of `PUT /notifications/read`.
#[derive(Debug, Default, Deserialize)]
pub struct MarkReadRequest {
    /// Ids to mark; omit to mark everything.
    #[serde(default)]
    pub notification_ids: Option<Vec<DbId>>,
}

/// Body of `POST /notifications/mention`.
#[derive(Debug, Deserialize)]
pub struct CreateMentionRequest {
    pub mentioned_user_id: DbId,
    pub question_id: DbId,
    pub answer_id: Option<DbId>,
    pub comment_id: Option<DbId>,
    /// Optional text scanned for further `@mentions`.
    #[serde(default)]
    pub body: String,
}

// ---------------------------------------------------------------------------
// Listing and counts
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
///
/// List the authenticated user's notifications, newest first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let notification_type = params
        .notification_type
        .as_deref()
        .map(validate_notification_type)
        .transpose()
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let filter = NotificationFilter {
        unread_only: params.unread_only.unwrap_or(false),
        notification_type,
        limit: clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT),
        offset: clamp_offset(params.offset),
    };

    let notifications = state
        .notifications
        .inbox
        .list(auth.user_id, &filter)
        .await?;

    Ok(Json(serde_json::json!({
        "data": notifications,
        "pagination": { "limit": filter.limit, "offset": filter.offset },
    })))
}

/// GET /api/v1/notifications/unread-count
///
/// Served from the cache when warm.
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state.notifications.inbox.unread_count(auth.user_id).await?;

    Ok(Json(serde_json::json!({
        "data": { "count": count }
    })))
}

/// GET /api/v1/notifications/stats
pub async fn stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let stats = state.notifications.inbox.stats(auth.user_id).await?;
    Ok(Json(serde_json::json!({ "data": stats })))
}

// ---------------------------------------------------------------------------
// Read state and deletion
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/{id}/read
///
/// Mark a single notification as read. Idempotent. Returns 204 No Content,
/// or 404 if the notification does not belong to the authenticated user.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = state
        .notifications
        .inbox
        .mark_read(auth.user_id, notification_id)
        .await?;

    if !found {
        return Err(notification_not_found(notification_id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/notifications/read
///
/// Mark the listed notifications as read, or all of them when
/// `notification_ids` is omitted. Returns how many changed.
pub async fn mark_many_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<MarkReadRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state
        .notifications
        .inbox
        .mark_many_read(auth.user_id, input.notification_ids)
        .await?;

    Ok(Json(serde_json::json!({
        "data": { "marked_read": count }
    })))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state.notifications.inbox.mark_all_read(auth.user_id).await?;

    Ok(Json(serde_json::json!({
        "data": { "marked_read": count }
    })))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = state
        .notifications
        .inbox
        .delete(auth.user_id, notification_id)
        .await?;

    if !deleted {
        return Err(notification_not_found(notification_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Explicit mentions
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/mention
///
/// Notify `mentioned_user_id` that the caller mentioned them, plus anyone
/// `@mentioned` in `body`. Runs the fan-out inline and returns the ids of
/// the notifications created; the list is empty when every recipient was
/// suppressed (self-mention or disabled preference).
pub async fn create_mention(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateMentionRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if QuestionRepo::find_author_id(&state.pool, input.question_id)
        .await?
        .is_none()
    {
        return Err(question_not_found(input.question_id));
    }

    let event = ContentEvent::UserMentioned {
        actor_id: auth.user_id,
        mentioned_user_id: Some(input.mentioned_user_id),
        question_id: input.question_id,
        answer_id: input.answer_id,
        comment_id: input.comment_id,
        body: input.body,
    };
    let ids = state.notifications.fanout.on_content_created(&event).await;

    Ok(Json(serde_json::json!({
        "data": { "notification_ids": ids }
    })))
}

fn notification_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Notification",
        id,
    })
}
