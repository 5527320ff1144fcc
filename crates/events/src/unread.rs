//! Cached per-user unread notification count.
//!
//! The count lives under `user:<id>:unread_count` with a TTL. Any write
//! that changes a user's unread set deletes the key; the next read
//! recomputes it from storage. A per-user generation key is bumped on
//! each invalidation and guards the write-back of a recomputed count.
//! When the cache is unreachable reads fall through to storage and
//! invalidation is skipped.

use std::sync::Arc;
use std::time::Duration;

use stackit_core::channels::{unread_count_key, unread_generation_key};
use stackit_core::types::DbId;

use crate::cache::CacheStore;
use crate::error::{FanoutError, StoreError};
use crate::store::NotificationStore;

#[derive(Clone)]
pub struct UnreadCounter {
    store: Arc<dyn NotificationStore>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl UnreadCounter {
    pub fn new(store: Arc<dyn NotificationStore>, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    /// Unread count for `user_id`, from cache when present.
    ///
    /// A recomputed count is written back only if no invalidation happened
    /// while it was being counted. Only a storage failure is returned;
    /// cache failures are logged.
    pub async fn get(&self, user_id: DbId) -> Result<i64, StoreError> {
        let key = unread_count_key(user_id);
        let generation_key = unread_generation_key(user_id);

        let generation = match self.cache.get(&key).await {
            Ok(Some(value)) => match value.parse::<i64>() {
                Ok(count) => return Ok(count),
                Err(_) => {
                    tracing::warn!(user_id, value = %value, "Ignoring malformed cached unread count");
                    self.read_generation(user_id, &generation_key).await
                }
            },
            Ok(None) => self.read_generation(user_id, &generation_key).await,
            Err(e) => {
                let err = FanoutError::from(e);
                tracing::warn!(user_id, error = %err, "Unread count cache read failed");
                None
            }
        };

        let count = self.store.count_unread(user_id).await?;

        let Some(generation) = generation else {
            return Ok(count);
        };
        match self
            .cache
            .set_ex_if_guard(
                &key,
                &count.to_string(),
                self.ttl,
                &generation_key,
                generation.as_deref(),
            )
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(user_id, "Unread count invalidated during recompute, not caching");
            }
            Err(e) => {
                let err = FanoutError::from(e);
                tracing::warn!(user_id, error = %err, "Unread count cache write failed");
            }
        }

        Ok(count)
    }

    /// Generation observed before counting. `None` means the cache is
    /// unreachable and the count should not be written back.
    async fn read_generation(&self, user_id: DbId, generation_key: &str) -> Option<Option<String>> {
        match self.cache.get(generation_key).await {
            Ok(generation) => Some(generation),
            Err(e) => {
                let err = FanoutError::from(e);
                tracing::warn!(user_id, error = %err, "Unread generation read failed");
                None
            }
        }
    }

    /// Drop the cached count so the next read recomputes it.
    ///
    /// The generation bump comes first so an in-flight recompute that
    /// counted before this write cannot repopulate the key.
    pub async fn invalidate(&self, user_id: DbId) {
        if let Err(e) = self
            .cache
            .incr_ex(&unread_generation_key(user_id), self.ttl)
            .await
        {
            let err = FanoutError::from(e);
            tracing::warn!(user_id, error = %err, "Unread generation bump failed");
        }
        if let Err(e) = self.cache.delete(&unread_count_key(user_id)).await {
            let err = FanoutError::from(e);
            tracing::warn!(user_id, error = %err, "Unread count invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryCache, MemoryStore};
    use stackit_core::notification::NotificationType;
    use stackit_db::models::notification::CreateNotification;

    const TTL: Duration = Duration::from_secs(300);

    fn notification_for(user_id: DbId, actor: DbId) -> CreateNotification {
        CreateNotification {
            user_id,
            notification_type: NotificationType::Comment,
            message: "bob commented on your question".into(),
            question_id: None,
            answer_id: None,
            comment_id: None,
            actor_user_id: Some(actor),
        }
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let store = Arc::new(MemoryStore::new());
        let alice = store.add_user("alice");
        let bob = store.add_user("bob");
        store.insert_notification(&notification_for(alice, bob)).await.unwrap();

        let counter = UnreadCounter::new(store.clone(), Arc::new(MemoryCache::new()), TTL);

        assert_eq!(counter.get(alice).await.unwrap(), 1);
        assert_eq!(counter.get(alice).await.unwrap(), 1);
        assert_eq!(store.count_unread_calls(), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_recompute() {
        let store = Arc::new(MemoryStore::new());
        let alice = store.add_user("alice");
        let bob = store.add_user("bob");
        let counter = UnreadCounter::new(store.clone(), Arc::new(MemoryCache::new()), TTL);

        assert_eq!(counter.get(alice).await.unwrap(), 0);

        store.insert_notification(&notification_for(alice, bob)).await.unwrap();
        // Stale until invalidated.
        assert_eq!(counter.get(alice).await.unwrap(), 0);

        counter.invalidate(alice).await;
        assert_eq!(counter.get(alice).await.unwrap(), 1);
        assert_eq!(store.count_unread_calls(), 2);
    }

    #[tokio::test]
    async fn invalidation_during_recompute_is_not_overwritten() {
        let store = Arc::new(MemoryStore::new());
        let alice = store.add_user("alice");
        let bob = store.add_user("bob");
        let counter = UnreadCounter::new(store.clone(), Arc::new(MemoryCache::new()), TTL);

        let (counted, release) = store.hold_next_count();
        let in_flight = tokio::spawn({
            let counter = counter.clone();
            async move { counter.get(alice).await.unwrap() }
        });

        // The in-flight read has counted zero; a new notification lands
        // and invalidates before that read writes back.
        counted.notified().await;
        store.insert_notification(&notification_for(alice, bob)).await.unwrap();
        counter.invalidate(alice).await;
        release.notify_one();

        assert_eq!(in_flight.await.unwrap(), 0);
        assert_eq!(counter.get(alice).await.unwrap(), 1);
        assert_eq!(store.count_unread_calls(), 2);
    }

    #[tokio::test]
    async fn unavailable_cache_falls_back_to_store() {
        let store = Arc::new(MemoryStore::new());
        let alice = store.add_user("alice");
        let bob = store.add_user("bob");
        store.insert_notification(&notification_for(alice, bob)).await.unwrap();

        let cache = Arc::new(MemoryCache::new());
        cache.set_available(false);
        let counter = UnreadCounter::new(store.clone(), cache, TTL);

        assert_eq!(counter.get(alice).await.unwrap(), 1);
        assert_eq!(counter.get(alice).await.unwrap(), 1);
        assert_eq!(store.count_unread_calls(), 2);
        counter.invalidate(alice).await;
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_recomputed() {
        let store = Arc::new(MemoryStore::new());
        let alice = store.add_user("alice");
        let counter = UnreadCounter::new(store.clone(), Arc::new(MemoryCache::new()), TTL);

        counter.get(alice).await.unwrap();
        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        counter.get(alice).await.unwrap();

        assert_eq!(store.count_unread_calls(), 2);
    }
}
