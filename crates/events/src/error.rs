//! Error types for the notification layer.
//!
//! [`StoreError`] and [`CacheError`] come out of the two storage seams.
//! [`FanoutError`] names the per-recipient failures of a fan-out; those are
//! logged and skipped, never returned to the caller.

use stackit_core::types::DbId;

/// Failure from a [`NotificationStore`](crate::store::NotificationStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying Postgres query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A write was rejected by an integrity rule.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Failure from a [`CacheStore`](crate::cache::CacheStore).
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The Redis command or connection failed.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The cache cannot be reached at all.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Per-recipient fan-out failure.
#[derive(Debug, thiserror::Error)]
pub enum FanoutError {
    /// A mention or direct recipient did not resolve to a user.
    #[error("Unresolved recipient: {0}")]
    UnresolvedRecipient(String),

    /// The preference row could not be read; the category is treated as enabled.
    #[error("Preference lookup failed for user {user_id}: {source}")]
    PreferenceLookupFailure { user_id: DbId, source: StoreError },

    /// Inserting the notification row failed; the candidate is skipped.
    #[error("Failed to write notification for user {user_id}: {source}")]
    NotificationWriteFailure { user_id: DbId, source: StoreError },

    /// The cache could not be invalidated or published to.
    #[error(transparent)]
    CacheUnavailable(#[from] CacheError),
}
