//! StackIt notification fan-out and delivery infrastructure.
//!
//! - [`NotificationStore`] / [`CacheStore`]: the persistence and
//!   cache/pub-sub seams, with Postgres ([`PgNotificationStore`]), Redis
//!   ([`RedisCache`]) and in-memory ([`memory`]) implementations.
//! - [`NotificationFanout`]: turns one [`ContentEvent`] into zero or more
//!   recipient notifications.
//! - [`PreferenceGate`], [`UnreadCounter`], [`RealtimePublisher`]: the
//!   per-recipient steps the fan-out and the inbox share.
//! - [`NotificationInbox`]: read-state transitions and listing.
//! - [`FanoutQueue`] / [`FanoutWorker`]: fire-and-forget hand-off from
//!   request handlers.
//! - [`NotificationRetention`]: periodic age-based purge.
//!
//! [`ContentEvent`]: stackit_core::content::ContentEvent

pub mod cache;
pub mod config;
pub mod error;
pub mod fanout;
pub mod inbox;
pub mod memory;
pub mod preferences;
pub mod queue;
pub mod realtime;
pub mod retention;
pub mod store;
pub mod unread;

pub use cache::{CacheStore, ChannelMessage, RedisCache};
pub use config::NotificationConfig;
pub use error::{CacheError, FanoutError, StoreError};
pub use fanout::NotificationFanout;
pub use inbox::NotificationInbox;
pub use preferences::PreferenceGate;
pub use queue::{FanoutQueue, FanoutWorker};
pub use realtime::{RealtimeMessage, RealtimePublisher};
pub use retention::NotificationRetention;
pub use store::{NotificationFilter, NotificationStore, PgNotificationStore};
pub use unread::UnreadCounter;
