//! A user's view of their notifications: listing, counts and read state.
//!
//! Every write that can change the unread set invalidates the cached
//! count after the store confirms it, and read transitions are announced
//! on the user's real-time channel.

use std::sync::Arc;

use stackit_core::types::DbId;
use stackit_db::models::notification::{Notification, NotificationStats};

use crate::error::StoreError;
use crate::realtime::{RealtimeMessage, RealtimePublisher};
use crate::store::{NotificationFilter, NotificationStore};
use crate::unread::UnreadCounter;

#[derive(Clone)]
pub struct NotificationInbox {
    store: Arc<dyn NotificationStore>,
    unread: UnreadCounter,
    realtime: RealtimePublisher,
}

impl NotificationInbox {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        unread: UnreadCounter,
        realtime: RealtimePublisher,
    ) -> Self {
        Self {
            store,
            unread,
            realtime,
        }
    }

    /// Newest-first page of a user's notifications.
    pub async fn list(
        &self,
        user_id: DbId,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, StoreError> {
        self.store.list_notifications(user_id, filter).await
    }

    pub async fn unread_count(&self, user_id: DbId) -> Result<i64, StoreError> {
        self.unread.get(user_id).await
    }

    pub async fn stats(&self, user_id: DbId) -> Result<NotificationStats, StoreError> {
        self.store.stats(user_id).await
    }

    /// Mark one notification read.
    ///
    /// Idempotent: marking an already-read notification succeeds again.
    /// Returns `false` if the notification does not exist or belongs to
    /// another user.
    pub async fn mark_read(&self, user_id: DbId, notification_id: DbId) -> Result<bool, StoreError> {
        let found = self.store.mark_read(notification_id, user_id).await?;
        if found {
            self.unread.invalidate(user_id).await;
            self.realtime
                .publish(
                    user_id,
                    &RealtimeMessage::notifications_read(1, Some(vec![notification_id])),
                )
                .await;
        }
        Ok(found)
    }

    /// Mark the listed notifications read, or all of them when `ids` is `None`.
    ///
    /// Returns how many went from unread to read.
    pub async fn mark_many_read(
        &self,
        user_id: DbId,
        ids: Option<Vec<DbId>>,
    ) -> Result<u64, StoreError> {
        let count = match &ids {
            Some(ids) if ids.is_empty() => return Ok(0),
            Some(ids) => self.store.mark_many_read(user_id, ids).await?,
            None => self.store.mark_all_read(user_id).await?,
        };
        if count == 0 {
            return Ok(0);
        }

        self.unread.invalidate(user_id).await;
        self.realtime
            .publish(user_id, &RealtimeMessage::notifications_read(count, ids))
            .await;

        tracing::info!(user_id, count, "Notifications marked read");
        Ok(count)
    }

    pub async fn mark_all_read(&self, user_id: DbId) -> Result<u64, StoreError> {
        self.mark_many_read(user_id, None).await
    }

    /// Delete one of the user's notifications.
    pub async fn delete(&self, user_id: DbId, notification_id: DbId) -> Result<bool, StoreError> {
        let deleted = self
            .store
            .delete_notification(notification_id, user_id)
            .await?;
        if deleted {
            self.unread.invalidate(user_id).await;
        }
        Ok(deleted)
    }
}
