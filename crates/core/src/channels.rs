//! Well-known cache key and pub/sub channel names.
//!
//! These must match what the notification services write and what the
//! real-time relay subscribes to.

use crate::types::DbId;

/// Prefix of every per-user real-time channel.
pub const USER_CHANNEL_PREFIX: &str = "notifications:user:";

/// Pattern matching every per-user real-time channel.
pub const USER_CHANNEL_PATTERN: &str = "notifications:user:*";

/// Real-time channel for one user: `notifications:user:<id>`.
pub fn user_channel(user_id: DbId) -> String {
    format!("{USER_CHANNEL_PREFIX}{user_id}")
}

/// Recover the user id from a per-user channel name.
pub fn parse_user_channel(channel: &str) -> Option<DbId> {
    channel.strip_prefix(USER_CHANNEL_PREFIX)?.parse().ok()
}

/// Cache key holding a user's unread notification count.
pub fn unread_count_key(user_id: DbId) -> String {
    format!("user:{user_id}:unread_count")
}

/// Cache key bumped on every unread-count invalidation, so a recompute
/// started before the invalidation cannot write its result back.
pub fn unread_generation_key(user_id: DbId) -> String {
    format!("user:{user_id}:unread_generation")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_name_round_trips() {
        assert_eq!(user_channel(42), "notifications:user:42");
        assert_eq!(parse_user_channel("notifications:user:42"), Some(42));
    }

    #[test]
    fn foreign_channel_is_not_parsed() {
        assert_eq!(parse_user_channel("votes:user:42"), None);
        assert_eq!(parse_user_channel("notifications:user:abc"), None);
    }

    #[test]
    fn unread_key_is_scoped_to_user() {
        assert_eq!(unread_count_key(7), "user:7:unread_count");
        assert_ne!(unread_count_key(7), unread_count_key(8));
        assert_ne!(unread_count_key(7), unread_generation_key(7));
    }
}
