//! Periodic purge of old notifications.
//!
//! Removes notifications whose `created_at` is older than the configured
//! retention, read or not. Cached unread counts are left to expire.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;
use crate::store::NotificationStore;

#[derive(Clone)]
pub struct NotificationRetention {
    store: Arc<dyn NotificationStore>,
}

impl NotificationRetention {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Delete notifications created more than `days` days ago.
    ///
    /// Returns the number of rows deleted.
    pub async fn cleanup_older_than(&self, days: i64) -> Result<u64, StoreError> {
        let cutoff = Utc::now() - chrono::Duration::days(days);
        let deleted = self.store.delete_older_than(cutoff).await?;
        if deleted > 0 {
            tracing::info!(deleted, retention_days = days, "Notification retention: purged old rows");
        }
        Ok(deleted)
    }

    /// Run the retention loop until `cancel` is triggered.
    ///
    /// The first sweep happens immediately, then once per `interval`.
    pub async fn run(self, retention_days: i64, interval: Duration, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = interval.as_secs(),
            retention_days,
            "Notification retention job started"
        );

        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification retention job stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.cleanup_older_than(retention_days).await {
                        tracing::error!(error = %e, "Notification retention: cleanup failed");
                    }
                }
            }
        }
    }
}
