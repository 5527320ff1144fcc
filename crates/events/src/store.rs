//! Persistence seam for the notification layer.
//!
//! [`NotificationStore`] is everything the fan-out, the inbox and the
//! retention job need from storage. [`PgNotificationStore`] backs it with
//! the `stackit-db` repositories; [`MemoryStore`](crate::memory::MemoryStore)
//! backs it in tests.

use async_trait::async_trait;
use stackit_core::notification::{NotificationPreferences, NotificationType};
use stackit_core::types::{DbId, Timestamp};
use stackit_db::models::notification::{CreateNotification, Notification, NotificationStats};
use stackit_db::repositories::{
    AnswerRepo, NotificationPreferenceRepo, NotificationRepo, QuestionRepo, UserRepo,
};
use stackit_db::DbPool;

use crate::error::StoreError;

/// Default page size for notification listings.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Largest page size a caller may request.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Listing filter for a user's notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFilter {
    pub unread_only: bool,
    pub notification_type: Option<NotificationType>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for NotificationFilter {
    fn default() -> Self {
        Self {
            unread_only: false,
            notification_type: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

/// Storage operations used by the notification services.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Resolve a username to a user id.
    async fn find_user_id_by_username(&self, username: &str) -> Result<Option<DbId>, StoreError>;

    /// Display name for a user id.
    async fn find_username(&self, user_id: DbId) -> Result<Option<String>, StoreError>;

    async fn find_question_author(&self, question_id: DbId) -> Result<Option<DbId>, StoreError>;

    async fn find_answer_author(&self, answer_id: DbId) -> Result<Option<DbId>, StoreError>;

    /// Stored preference flags, or `None` if the user never saved any.
    async fn get_preferences(
        &self,
        user_id: DbId,
    ) -> Result<Option<NotificationPreferences>, StoreError>;

    /// Replace the full preference row for a user.
    async fn upsert_preferences(
        &self,
        user_id: DbId,
        prefs: &NotificationPreferences,
    ) -> Result<NotificationPreferences, StoreError>;

    async fn insert_notification(
        &self,
        input: &CreateNotification,
    ) -> Result<Notification, StoreError>;

    async fn count_unread(&self, user_id: DbId) -> Result<i64, StoreError>;

    async fn list_notifications(
        &self,
        user_id: DbId,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, StoreError>;

    /// Mark one notification read. `false` if it does not belong to the user.
    async fn mark_read(&self, notification_id: DbId, user_id: DbId) -> Result<bool, StoreError>;

    /// Mark the listed notifications read. Returns the number that changed.
    async fn mark_many_read(&self, user_id: DbId, ids: &[DbId]) -> Result<u64, StoreError>;

    /// Mark every unread notification read. Returns the number that changed.
    async fn mark_all_read(&self, user_id: DbId) -> Result<u64, StoreError>;

    async fn delete_notification(
        &self,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, StoreError>;

    /// Delete notifications created before `cutoff`. Returns the count removed.
    async fn delete_older_than(&self, cutoff: Timestamp) -> Result<u64, StoreError>;

    async fn stats(&self, user_id: DbId) -> Result<NotificationStats, StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// [`NotificationStore`] over a Postgres pool.
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn find_user_id_by_username(&self, username: &str) -> Result<Option<DbId>, StoreError> {
        Ok(UserRepo::find_id_by_username(&self.pool, username).await?)
    }

    async fn find_username(&self, user_id: DbId) -> Result<Option<String>, StoreError> {
        Ok(UserRepo::find_username(&self.pool, user_id).await?)
    }

    async fn find_question_author(&self, question_id: DbId) -> Result<Option<DbId>, StoreError> {
        Ok(QuestionRepo::find_author_id(&self.pool, question_id).await?)
    }

    async fn find_answer_author(&self, answer_id: DbId) -> Result<Option<DbId>, StoreError> {
        Ok(AnswerRepo::find_author_id(&self.pool, answer_id).await?)
    }

    async fn get_preferences(
        &self,
        user_id: DbId,
    ) -> Result<Option<NotificationPreferences>, StoreError> {
        let row = NotificationPreferenceRepo::get_for_user(&self.pool, user_id).await?;
        Ok(row.map(|r| r.preferences()))
    }

    async fn upsert_preferences(
        &self,
        user_id: DbId,
        prefs: &NotificationPreferences,
    ) -> Result<NotificationPreferences, StoreError> {
        let row = NotificationPreferenceRepo::upsert(&self.pool, user_id, prefs).await?;
        Ok(row.preferences())
    }

    async fn insert_notification(
        &self,
        input: &CreateNotification,
    ) -> Result<Notification, StoreError> {
        if input.actor_user_id == Some(input.user_id) {
            return Err(StoreError::Constraint(
                "notification recipient equals actor".into(),
            ));
        }
        Ok(NotificationRepo::create(&self.pool, input).await?)
    }

    async fn count_unread(&self, user_id: DbId) -> Result<i64, StoreError> {
        Ok(NotificationRepo::unread_count(&self.pool, user_id).await?)
    }

    async fn list_notifications(
        &self,
        user_id: DbId,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, StoreError> {
        Ok(NotificationRepo::list_for_user(
            &self.pool,
            user_id,
            filter.unread_only,
            filter.notification_type.map(|t| t.as_str()),
            filter.limit,
            filter.offset,
        )
        .await?)
    }

    async fn mark_read(&self, notification_id: DbId, user_id: DbId) -> Result<bool, StoreError> {
        Ok(NotificationRepo::mark_read(&self.pool, notification_id, user_id).await?)
    }

    async fn mark_many_read(&self, user_id: DbId, ids: &[DbId]) -> Result<u64, StoreError> {
        Ok(NotificationRepo::mark_many_read(&self.pool, user_id, ids).await?)
    }

    async fn mark_all_read(&self, user_id: DbId) -> Result<u64, StoreError> {
        Ok(NotificationRepo::mark_all_read(&self.pool, user_id).await?)
    }

    async fn delete_notification(
        &self,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, StoreError> {
        Ok(NotificationRepo::delete(&self.pool, notification_id, user_id).await?)
    }

    async fn delete_older_than(&self, cutoff: Timestamp) -> Result<u64, StoreError> {
        Ok(NotificationRepo::delete_older_than(&self.pool, cutoff).await?)
    }

    async fn stats(&self, user_id: DbId) -> Result<NotificationStats, StoreError> {
        Ok(NotificationRepo::stats(&self.pool, user_id).await?)
    }
}
