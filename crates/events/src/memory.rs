//! In-process [`NotificationStore`] and [`CacheStore`] implementations.
//!
//! [`MemoryCache`] is also what the server runs with when no Redis URL is
//! configured; real-time delivery then only reaches sockets on the same
//! process. [`MemoryStore`] exists for tests and records how often the
//! unread count was computed so cache hits can be observed.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::BoxStream;
use futures::StreamExt;
use stackit_core::notification::{NotificationPreferences, NotificationType};
use stackit_core::types::{DbId, Timestamp};
use stackit_db::models::notification::{CreateNotification, Notification, NotificationStats};
use tokio::sync::{broadcast, Notify};
use tokio::time::Instant;

use crate::cache::{channel_matches, CacheStore, ChannelMessage};
use crate::error::{CacheError, StoreError};
use crate::store::{NotificationFilter, NotificationStore};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    next_id: DbId,
    users: BTreeMap<DbId, String>,
    question_authors: HashMap<DbId, DbId>,
    answer_authors: HashMap<DbId, DbId>,
    preferences: HashMap<DbId, NotificationPreferences>,
    notifications: Vec<Notification>,
    failing_recipients: HashSet<DbId>,
    fail_preference_lookups: bool,
}

impl StoreState {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// Vec-backed [`NotificationStore`].
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    count_unread_calls: AtomicUsize,
    count_hold: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a user and return its id.
    pub fn add_user(&self, username: &str) -> DbId {
        let mut state = self.state();
        let id = state.allocate_id();
        state.users.insert(id, username.to_string());
        id
    }

    /// Register a question written by `author_id` and return its id.
    pub fn add_question(&self, author_id: DbId) -> DbId {
        let mut state = self.state();
        let id = state.allocate_id();
        state.question_authors.insert(id, author_id);
        id
    }

    /// Register an answer written by `author_id` and return its id.
    pub fn add_answer(&self, author_id: DbId) -> DbId {
        let mut state = self.state();
        let id = state.allocate_id();
        state.answer_authors.insert(id, author_id);
        id
    }

    pub fn set_preferences(&self, user_id: DbId, prefs: NotificationPreferences) {
        self.state().preferences.insert(user_id, prefs);
    }

    /// Make every notification insert for `user_id` fail.
    pub fn fail_inserts_for(&self, user_id: DbId) {
        self.state().failing_recipients.insert(user_id);
    }

    /// Make every preference lookup fail.
    pub fn fail_preference_lookups(&self, fail: bool) {
        self.state().fail_preference_lookups = fail;
    }

    /// Snapshot of all stored notifications in insertion order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.state().notifications.clone()
    }

    /// Snapshot of one user's notifications in insertion order.
    pub fn notifications_for(&self, user_id: DbId) -> Vec<Notification> {
        self.state()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Overwrite a notification's creation time.
    pub fn set_created_at(&self, notification_id: DbId, created_at: Timestamp) {
        if let Some(n) = self
            .state()
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
        {
            n.created_at = created_at;
        }
    }

    /// How many times the unread count was computed from storage.
    pub fn count_unread_calls(&self) -> usize {
        self.count_unread_calls.load(Ordering::SeqCst)
    }

    /// Pause the next `count_unread` after it has counted. The first handle
    /// is notified once the count is taken; notifying the second resumes it.
    pub fn hold_next_count(&self) -> (Arc<Notify>, Arc<Notify>) {
        let counted = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.count_hold.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((counted.clone(), release.clone()));
        (counted, release)
    }
}

fn lookup_failure() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn find_user_id_by_username(&self, username: &str) -> Result<Option<DbId>, StoreError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|(_, name)| name.as_str() == username)
            .map(|(id, _)| *id))
    }

    async fn find_username(&self, user_id: DbId) -> Result<Option<String>, StoreError> {
        Ok(self.state().users.get(&user_id).cloned())
    }

    async fn find_question_author(&self, question_id: DbId) -> Result<Option<DbId>, StoreError> {
        Ok(self.state().question_authors.get(&question_id).copied())
    }

    async fn find_answer_author(&self, answer_id: DbId) -> Result<Option<DbId>, StoreError> {
        Ok(self.state().answer_authors.get(&answer_id).copied())
    }

    async fn get_preferences(
        &self,
        user_id: DbId,
    ) -> Result<Option<NotificationPreferences>, StoreError> {
        let state = self.state();
        if state.fail_preference_lookups {
            return Err(lookup_failure());
        }
        Ok(state.preferences.get(&user_id).copied())
    }

    async fn upsert_preferences(
        &self,
        user_id: DbId,
        prefs: &NotificationPreferences,
    ) -> Result<NotificationPreferences, StoreError> {
        self.state().preferences.insert(user_id, *prefs);
        Ok(*prefs)
    }

    async fn insert_notification(
        &self,
        input: &CreateNotification,
    ) -> Result<Notification, StoreError> {
        let mut state = self.state();
        if input.actor_user_id == Some(input.user_id) {
            return Err(StoreError::Constraint(
                "notification recipient equals actor".into(),
            ));
        }
        if state.failing_recipients.contains(&input.user_id) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let notification = Notification {
            id: state.allocate_id(),
            user_id: input.user_id,
            notification_type: input.notification_type.as_str().to_string(),
            message: input.message.clone(),
            question_id: input.question_id,
            answer_id: input.answer_id,
            comment_id: input.comment_id,
            actor_user_id: input.actor_user_id,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn count_unread(&self, user_id: DbId) -> Result<i64, StoreError> {
        self.count_unread_calls.fetch_add(1, Ordering::SeqCst);
        let count = self
            .state()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count();

        let hold = self
            .count_hold
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((counted, release)) = hold {
            counted.notify_one();
            release.notified().await;
        }
        Ok(count as i64)
    }

    async fn list_notifications(
        &self,
        user_id: DbId,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut rows: Vec<Notification> = self
            .state()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .filter(|n| !filter.unread_only || !n.is_read)
            .filter(|n| {
                filter
                    .notification_type
                    .map_or(true, |t| n.notification_type == t.as_str())
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn mark_read(&self, notification_id: DbId, user_id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state();
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
        {
            Some(n) => {
                if !n.is_read {
                    n.is_read = true;
                    n.read_at = Some(Utc::now());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_many_read(&self, user_id: DbId, ids: &[DbId]) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut changed = 0;
        for n in self.state().notifications.iter_mut() {
            if n.user_id == user_id && !n.is_read && ids.contains(&n.id) {
                n.is_read = true;
                n.read_at = Some(now);
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn mark_all_read(&self, user_id: DbId) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut changed = 0;
        for n in self.state().notifications.iter_mut() {
            if n.user_id == user_id && !n.is_read {
                n.is_read = true;
                n.read_at = Some(now);
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_notification(
        &self,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, StoreError> {
        let mut state = self.state();
        let before = state.notifications.len();
        state
            .notifications
            .retain(|n| !(n.id == notification_id && n.user_id == user_id));
        Ok(state.notifications.len() < before)
    }

    async fn delete_older_than(&self, cutoff: Timestamp) -> Result<u64, StoreError> {
        let mut state = self.state();
        let before = state.notifications.len();
        state.notifications.retain(|n| n.created_at >= cutoff);
        Ok((before - state.notifications.len()) as u64)
    }

    async fn stats(&self, user_id: DbId) -> Result<NotificationStats, StoreError> {
        let state = self.state();
        let mut stats = NotificationStats::default();
        for n in state.notifications.iter().filter(|n| n.user_id == user_id) {
            stats.total_notifications += 1;
            if !n.is_read {
                stats.unread_count += 1;
            }
            match NotificationType::parse(&n.notification_type) {
                Some(NotificationType::Answer) => stats.answer_count += 1,
                Some(NotificationType::Comment) => stats.comment_count += 1,
                Some(NotificationType::Mention) => stats.mention_count += 1,
                Some(NotificationType::Vote) => stats.vote_count += 1,
                None => {}
            }
            stats.latest_notification = stats.latest_notification.max(Some(n.created_at));
        }
        Ok(stats)
    }
}

// ---------------------------------------------------------------------------
// MemoryCache
// ---------------------------------------------------------------------------

/// Capacity of the in-process pub/sub channel.
const PUBSUB_CAPACITY: usize = 1024;

/// HashMap-and-broadcast [`CacheStore`].
///
/// Expiry uses [`tokio::time::Instant`], so paused-clock tests can advance
/// past a TTL.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    channel: broadcast::Sender<ChannelMessage>,
    available: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        let (channel, _) = broadcast::channel(PUBSUB_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            channel,
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the cache going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, (String, Instant)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), CacheError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("in-memory cache marked offline".into()))
        }
    }
}

/// Drop every entry whose expiry has passed.
fn prune_expired(entries: &mut HashMap<String, (String, Instant)>, now: Instant) {
    entries.retain(|_, (_, expires_at)| *expires_at > now);
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check_available()?;
        let mut entries = self.entries();
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries();
        prune_expired(&mut entries, now);
        entries.insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check_available()?;
        self.entries().remove(key);
        Ok(())
    }

    async fn incr_ex(&self, key: &str, ttl: Duration) -> Result<i64, CacheError> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries();
        let current = match entries.get(key) {
            Some((value, expires_at)) if *expires_at > now => value
                .parse::<i64>()
                .map_err(|_| CacheError::Unavailable(format!("value at {key} is not an integer")))?,
            _ => 0,
        };
        let next = current + 1;
        entries.insert(key.to_string(), (next.to_string(), now + ttl));
        Ok(next)
    }

    async fn set_ex_if_guard(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        guard: &str,
        expected: Option<&str>,
    ) -> Result<bool, CacheError> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries();
        let current = entries
            .get(guard)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value.as_str());
        if current != expected {
            return Ok(false);
        }
        prune_expired(&mut entries, now);
        entries.insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(true)
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<u64, CacheError> {
        self.check_available()?;
        let message = ChannelMessage {
            channel: channel.to_string(),
            payload: payload.to_string(),
        };
        // No subscribers is not an error.
        Ok(self.channel.send(message).map_or(0, |n| n as u64))
    }

    async fn subscribe_pattern(
        &self,
        pattern: &str,
    ) -> Result<BoxStream<'static, ChannelMessage>, CacheError> {
        self.check_available()?;
        let pattern = pattern.to_string();
        let receiver = self.channel.subscribe();

        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => return Some((message, receiver)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "In-memory subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .filter(move |message| futures::future::ready(channel_matches(&pattern, &message.channel)));

        Ok(stream.boxed())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.check_available()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
