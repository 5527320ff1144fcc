//! Per-user real-time event publishing.
//!
//! Messages are JSON objects tagged by `type` and published on
//! `notifications:user:<id>`. Delivery is best-effort: a publish failure
//! never fails the operation that triggered it.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use stackit_core::channels::user_channel;
use stackit_core::types::{DbId, Timestamp};
use stackit_db::models::notification::Notification;

use crate::cache::CacheStore;
use crate::error::FanoutError;

/// A real-time message for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeMessage {
    /// A notification was just created for the user.
    NewNotification {
        notification: Notification,
        timestamp: Timestamp,
    },
    /// Some or all of the user's notifications were marked read.
    /// `notification_ids` is `None` for mark-all.
    NotificationsRead {
        count: u64,
        notification_ids: Option<Vec<DbId>>,
        timestamp: Timestamp,
    },
}

impl RealtimeMessage {
    pub fn new_notification(notification: Notification) -> Self {
        Self::NewNotification {
            notification,
            timestamp: Utc::now(),
        }
    }

    pub fn notifications_read(count: u64, notification_ids: Option<Vec<DbId>>) -> Self {
        Self::NotificationsRead {
            count,
            notification_ids,
            timestamp: Utc::now(),
        }
    }
}

/// Publishes [`RealtimeMessage`]s to per-user channels.
#[derive(Clone)]
pub struct RealtimePublisher {
    cache: Arc<dyn CacheStore>,
}

impl RealtimePublisher {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Publish `message` to `user_id`'s channel, logging any failure.
    pub async fn publish(&self, user_id: DbId, message: &RealtimeMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to serialize real-time message");
                return;
            }
        };

        match self.cache.publish(&user_channel(user_id), &payload).await {
            Ok(receivers) => {
                tracing::debug!(user_id, receivers, "Published real-time message");
            }
            Err(e) => {
                let err = FanoutError::from(e);
                tracing::warn!(user_id, error = %err, "Real-time publish failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCache;
    use futures::StreamExt;
    use stackit_core::channels::USER_CHANNEL_PATTERN;

    #[test]
    fn read_message_shape() {
        let msg = RealtimeMessage::notifications_read(2, Some(vec![4, 5]));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "notifications_read");
        assert_eq!(json["count"], 2);
        assert_eq!(json["notification_ids"], serde_json::json!([4, 5]));
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn mark_all_message_has_null_ids() {
        let msg = RealtimeMessage::notifications_read(7, None);
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json["notification_ids"].is_null());
    }

    #[tokio::test]
    async fn publishes_on_user_channel() {
        let cache = Arc::new(MemoryCache::new());
        let mut stream = cache.subscribe_pattern(USER_CHANNEL_PATTERN).await.unwrap();
        let publisher = RealtimePublisher::new(cache.clone());

        publisher
            .publish(12, &RealtimeMessage::notifications_read(1, Some(vec![3])))
            .await;

        let message = stream.next().await.unwrap();
        assert_eq!(message.channel, "notifications:user:12");
        let json: serde_json::Value = serde_json::from_str(&message.payload).unwrap();
        assert_eq!(json["type"], "notifications_read");
    }

    #[tokio::test]
    async fn publish_failure_is_swallowed() {
        let cache = Arc::new(MemoryCache::new());
        cache.set_available(false);
        RealtimePublisher::new(cache)
            .publish(1, &RealtimeMessage::notifications_read(0, None))
            .await;
    }
}
