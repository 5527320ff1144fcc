//! Repository for the `user_notification_preferences` table.

use sqlx::PgPool;
use stackit_core::notification::NotificationPreferences;
use stackit_core::types::DbId;

use crate::models::notification::UserNotificationPreference;

/// Column list for `user_notification_preferences` queries.
const COLUMNS: &str = "id, user_id, answer_notifications, comment_notifications, \
    mention_notifications, vote_notifications, created_at, updated_at";

/// Read and replace a user's notification preference row.
pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// Get the stored preference row for a user, if any.
    ///
    /// Absence means every category is enabled; callers must not read it
    /// as "no notifications".
    pub async fn get_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserNotificationPreference>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM user_notification_preferences WHERE user_id = $1");
        sqlx::query_as::<_, UserNotificationPreference>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the whole preference row for a user.
    ///
    /// Uses `INSERT ... ON CONFLICT (user_id) DO UPDATE` so every flag is
    /// overwritten in a single round-trip.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        prefs: &NotificationPreferences,
    ) -> Result<UserNotificationPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_notification_preferences \
                (user_id, answer_notifications, comment_notifications, \
                 mention_notifications, vote_notifications) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                answer_notifications = EXCLUDED.answer_notifications, \
                comment_notifications = EXCLUDED.comment_notifications, \
                mention_notifications = EXCLUDED.mention_notifications, \
                vote_notifications = EXCLUDED.vote_notifications, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserNotificationPreference>(&query)
            .bind(user_id)
            .bind(prefs.answer_notifications)
            .bind(prefs.comment_notifications)
            .bind(prefs.mention_notifications)
            .bind(prefs.vote_notifications)
            .fetch_one(pool)
            .await
    }
}
