//! Handlers for `/notifications/preferences`.

use axum::extract::State;
use axum::Json;
use stackit_core::notification::NotificationPreferences;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/notifications/preferences
///
/// The caller's flags; every category is enabled when nothing was saved.
pub async fn get_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<NotificationPreferences>>> {
    let prefs = state.notifications.preferences.get(auth.user_id).await?;
    Ok(Json(DataResponse { data: prefs }))
}

/// PUT /api/v1/notifications/preferences
///
/// Replace all four flags. A body missing any flag is rejected with 400.
pub async fn update_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<DataResponse<NotificationPreferences>>> {
    let prefs: NotificationPreferences = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid preferences: {e}")))?;

    let saved = state
        .notifications
        .preferences
        .update(auth.user_id, prefs)
        .await?;
    Ok(Json(DataResponse { data: saved }))
}
