//! Per-user, per-category notification gating.

use std::sync::Arc;

use stackit_core::notification::{NotificationPreferences, NotificationType};
use stackit_core::types::DbId;

use crate::error::{FanoutError, StoreError};
use crate::store::NotificationStore;

/// Reads and writes preference rows and answers "may this user receive
/// this category?".
#[derive(Clone)]
pub struct PreferenceGate {
    store: Arc<dyn NotificationStore>,
}

impl PreferenceGate {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Whether `user_id` accepts notifications of `category`.
    ///
    /// A user without a stored row has every category enabled. A failed
    /// lookup is logged and also treated as enabled.
    pub async fn is_enabled(&self, user_id: DbId, category: NotificationType) -> bool {
        match self.store.get_preferences(user_id).await {
            Ok(Some(prefs)) => prefs.is_enabled(category),
            Ok(None) => true,
            Err(source) => {
                let err = FanoutError::PreferenceLookupFailure { user_id, source };
                tracing::warn!(
                    user_id,
                    category = %category,
                    error = %err,
                    "Preference lookup failed, defaulting to enabled"
                );
                true
            }
        }
    }

    /// Current flags for a user, defaults when no row exists.
    pub async fn get(&self, user_id: DbId) -> Result<NotificationPreferences, StoreError> {
        Ok(self
            .store
            .get_preferences(user_id)
            .await?
            .unwrap_or_default())
    }

    /// Replace every flag for a user.
    pub async fn update(
        &self,
        user_id: DbId,
        prefs: NotificationPreferences,
    ) -> Result<NotificationPreferences, StoreError> {
        let saved = self.store.upsert_preferences(user_id, &prefs).await?;
        tracing::info!(user_id, "Notification preferences updated");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn missing_row_enables_every_category() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("alice");
        let gate = PreferenceGate::new(store);

        for category in NotificationType::ALL {
            assert!(gate.is_enabled(user, category).await);
        }
    }

    #[tokio::test]
    async fn stored_flag_disables_only_its_category() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("alice");
        let gate = PreferenceGate::new(store.clone());

        gate.update(
            user,
            NotificationPreferences {
                comment_notifications: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(!gate.is_enabled(user, NotificationType::Comment).await);
        assert!(gate.is_enabled(user, NotificationType::Answer).await);
    }

    #[tokio::test]
    async fn lookup_failure_defaults_to_enabled() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("alice");
        store.set_preferences(
            user,
            NotificationPreferences {
                vote_notifications: false,
                ..Default::default()
            },
        );
        store.fail_preference_lookups(true);

        let gate = PreferenceGate::new(store);
        assert!(gate.is_enabled(user, NotificationType::Vote).await);
    }

    #[tokio::test]
    async fn get_returns_defaults_without_row() {
        let store = Arc::new(MemoryStore::new());
        let gate = PreferenceGate::new(store);
        assert_eq!(gate.get(99).await.unwrap(), NotificationPreferences::default());
    }
}
