//! Notification and notification-preference models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stackit_core::notification::{NotificationPreferences, NotificationType};
use stackit_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: String,
    pub message: String,
    pub question_id: Option<DbId>,
    pub answer_id: Option<DbId>,
    pub comment_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for inserting a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub notification_type: NotificationType,
    pub message: String,
    pub question_id: Option<DbId>,
    pub answer_id: Option<DbId>,
    pub comment_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
}

/// Aggregate counts for one user's notifications.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct NotificationStats {
    pub total_notifications: i64,
    pub unread_count: i64,
    pub answer_count: i64,
    pub comment_count: i64,
    pub mention_count: i64,
    pub vote_count: i64,
    pub latest_notification: Option<Timestamp>,
}

/// A row from the `user_notification_preferences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserNotificationPreference {
    pub id: DbId,
    pub user_id: DbId,
    pub answer_notifications: bool,
    pub comment_notifications: bool,
    pub mention_notifications: bool,
    pub vote_notifications: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserNotificationPreference {
    /// The flag values of this row.
    pub fn preferences(&self) -> NotificationPreferences {
        NotificationPreferences {
            answer_notifications: self.answer_notifications,
            comment_notifications: self.comment_notifications,
            mention_notifications: self.mention_notifications,
            vote_notifications: self.vote_notifications,
        }
    }
}
