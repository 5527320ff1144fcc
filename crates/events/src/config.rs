use std::time::Duration;

/// Default unread-count cache expiry in seconds.
const DEFAULT_UNREAD_CACHE_TTL_SECS: u64 = 300;
/// Default notification retention in days.
const DEFAULT_RETENTION_DAYS: i64 = 30;
/// Default interval between retention sweeps in seconds.
const DEFAULT_RETENTION_INTERVAL_SECS: u64 = 3600;
/// Longest accepted retention (100 years).
const MAX_RETENTION_DAYS: i64 = 36_500;
/// Default fan-out queue capacity.
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Tunables for the notification layer.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// How long a cached unread count stays valid.
    pub unread_cache_ttl: Duration,
    /// Notifications older than this many days are purged.
    pub retention_days: i64,
    /// How often the retention sweep runs.
    pub retention_interval: Duration,
    /// Bounded capacity of the fan-out queue.
    pub queue_capacity: usize,
}

impl NotificationConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                                | Default |
    /// |----------------------------------------|---------|
    /// | `UNREAD_CACHE_TTL_SECS`                | `300`   |
    /// | `NOTIFICATION_RETENTION_DAYS`          | `30`    |
    /// | `NOTIFICATION_RETENTION_INTERVAL_SECS` | `3600`  |
    /// | `FANOUT_QUEUE_CAPACITY`                | `1024`  |
    pub fn from_env() -> Self {
        let unread_cache_ttl_secs: u64 = std::env::var("UNREAD_CACHE_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_UNREAD_CACHE_TTL_SECS.to_string())
            .parse()
            .expect("UNREAD_CACHE_TTL_SECS must be a valid u64");

        let retention_days: i64 = std::env::var("NOTIFICATION_RETENTION_DAYS")
            .unwrap_or_else(|_| DEFAULT_RETENTION_DAYS.to_string())
            .parse()
            .expect("NOTIFICATION_RETENTION_DAYS must be a valid i64");
        let retention_days = check_retention_days(retention_days).unwrap_or_else(|e| panic!("{e}"));

        let retention_interval_secs: u64 = std::env::var("NOTIFICATION_RETENTION_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_RETENTION_INTERVAL_SECS.to_string())
            .parse()
            .expect("NOTIFICATION_RETENTION_INTERVAL_SECS must be a valid u64");
        let retention_interval_secs =
            check_retention_interval_secs(retention_interval_secs).unwrap_or_else(|e| panic!("{e}"));

        let queue_capacity: usize = std::env::var("FANOUT_QUEUE_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_QUEUE_CAPACITY.to_string())
            .parse()
            .expect("FANOUT_QUEUE_CAPACITY must be a valid usize");

        Self {
            unread_cache_ttl: Duration::from_secs(unread_cache_ttl_secs),
            retention_days,
            retention_interval: Duration::from_secs(retention_interval_secs),
            queue_capacity: queue_capacity.max(1),
        }
    }
}

fn check_retention_days(days: i64) -> Result<i64, String> {
    if (1..=MAX_RETENTION_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(format!(
            "NOTIFICATION_RETENTION_DAYS must be between 1 and {MAX_RETENTION_DAYS}, got {days}"
        ))
    }
}

fn check_retention_interval_secs(secs: u64) -> Result<u64, String> {
    if secs >= 1 {
        Ok(secs)
    } else {
        Err("NOTIFICATION_RETENTION_INTERVAL_SECS must be at least 1".to_string())
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            unread_cache_ttl: Duration::from_secs(DEFAULT_UNREAD_CACHE_TTL_SECS),
            retention_days: DEFAULT_RETENTION_DAYS,
            retention_interval: Duration::from_secs(DEFAULT_RETENTION_INTERVAL_SECS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
