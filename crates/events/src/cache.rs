//! Key-value cache and pub/sub seam.
//!
//! The unread counter stores its values here and the real-time publisher
//! publishes here. The WebSocket relay consumes the pattern subscription.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};

use crate::error::CacheError;

/// One message received on a subscribed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub channel: String,
    pub payload: String,
}

/// Cache and pub/sub operations.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Set `key` to `value`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Increment the integer at `key` and reset its expiry to `ttl`.
    /// Returns the new value.
    async fn incr_ex(&self, key: &str, ttl: Duration) -> Result<i64, CacheError>;

    /// Set `key` to `value` with `ttl`, but only while `guard` still holds
    /// `expected` (`None` meaning the guard key is absent). Returns whether
    /// the write happened.
    async fn set_ex_if_guard(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        guard: &str,
        expected: Option<&str>,
    ) -> Result<bool, CacheError>;

    /// Publish `payload` on `channel`. Returns the number of receivers.
    async fn publish(&self, channel: &str, payload: &str) -> Result<u64, CacheError>;

    /// Subscribe to every channel matching a glob `pattern` (`prefix*`).
    async fn subscribe_pattern(
        &self,
        pattern: &str,
    ) -> Result<BoxStream<'static, ChannelMessage>, CacheError>;

    /// Confirm the cache is reachable.
    async fn ping(&self) -> Result<(), CacheError>;
}

// ---------------------------------------------------------------------------
// Redis
// ---------------------------------------------------------------------------

/// Guarded SET: `KEYS[1]` value, `KEYS[2]` guard; `ARGV` is value, ttl
/// seconds, whether a guard value is expected (`1`/`0`), expected value.
static SET_EX_IF_GUARD: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        local current = redis.call('GET', KEYS[2])
        local matches
        if ARGV[3] == '1' then
            matches = current == ARGV[4]
        else
            matches = current == false
        end
        if matches then
            redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[2])
            return 1
        end
        return 0
        ",
    )
});

/// [`CacheStore`] over Redis.
///
/// Commands go through a shared [`ConnectionManager`], which reconnects on
/// its own. Each pattern subscription opens a dedicated pub/sub connection.
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
    connection: ConnectionManager,
}

impl RedisCache {
    /// Open a client for `redis_url` and establish the managed connection.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;
        Ok(Self { client, connection })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn incr_ex(&self, key: &str, ttl: Duration) -> Result<i64, CacheError> {
        let mut conn = self.connection.clone();
        let (value,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, ttl.as_secs().max(1) as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn set_ex_if_guard(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        guard: &str,
        expected: Option<&str>,
    ) -> Result<bool, CacheError> {
        let mut conn = self.connection.clone();
        let mut invocation = SET_EX_IF_GUARD.prepare_invoke();
        invocation
            .key(key)
            .key(guard)
            .arg(value)
            .arg(ttl.as_secs().max(1))
            .arg(if expected.is_some() { "1" } else { "0" })
            .arg(expected.unwrap_or(""));
        let written: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(written == 1)
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection.clone();
        Ok(conn.publish::<_, _, u64>(channel, payload).await?)
    }

    async fn subscribe_pattern(
        &self,
        pattern: &str,
    ) -> Result<BoxStream<'static, ChannelMessage>, CacheError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.psubscribe(pattern).await?;

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            let channel = msg.get_channel_name().to_string();
            match msg.get_payload::<String>() {
                Ok(payload) => Some(ChannelMessage { channel, payload }),
                Err(e) => {
                    tracing::warn!(channel = %channel, error = %e, "Dropping non-UTF-8 pub/sub payload");
                    None
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Whether `channel` matches a `prefix*` glob or equals `pattern` exactly.
pub fn channel_matches(pattern: &str, channel: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => channel.starts_with(prefix),
        None => channel == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_star_matches_prefix() {
        assert!(channel_matches("notifications:user:*", "notifications:user:9"));
        assert!(!channel_matches("notifications:user:*", "votes:user:9"));
    }

    #[test]
    fn plain_pattern_matches_exactly() {
        assert!(channel_matches("notifications:user:9", "notifications:user:9"));
        assert!(!channel_matches("notifications:user:9", "notifications:user:90"));
    }
}
