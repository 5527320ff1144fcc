//! Wiring of the notification services over one store and one cache.

use std::sync::Arc;

use stackit_core::content::ContentEvent;
use stackit_events::{
    CacheStore, FanoutQueue, FanoutWorker, NotificationConfig, NotificationFanout,
    NotificationInbox, NotificationRetention, NotificationStore, PreferenceGate,
    RealtimePublisher, UnreadCounter,
};
use tokio::sync::mpsc;

/// The notification services handlers reach through [`AppState`](crate::state::AppState).
#[derive(Clone)]
pub struct NotificationServices {
    /// Direct fan-out, for callers that need the created ids.
    pub fanout: NotificationFanout,
    /// Fire-and-forget fan-out.
    pub queue: FanoutQueue,
    pub inbox: NotificationInbox,
    pub preferences: PreferenceGate,
    pub retention: NotificationRetention,
}

/// Background half of [`NotificationServices`]; spawn with [`FanoutWorker::run`].
pub struct FanoutBackground {
    pub worker: FanoutWorker,
    pub receiver: mpsc::Receiver<ContentEvent>,
}

impl NotificationServices {
    /// Build every service over `store` and `cache`.
    ///
    /// The returned [`FanoutBackground`] must be spawned for queued events
    /// to be processed.
    pub fn build(
        store: Arc<dyn NotificationStore>,
        cache: Arc<dyn CacheStore>,
        config: &NotificationConfig,
    ) -> (Self, FanoutBackground) {
        let preferences = PreferenceGate::new(Arc::clone(&store));
        let unread = UnreadCounter::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            config.unread_cache_ttl,
        );
        let realtime = RealtimePublisher::new(cache);

        let fanout = NotificationFanout::new(
            Arc::clone(&store),
            preferences.clone(),
            unread.clone(),
            realtime.clone(),
        );
        let inbox = NotificationInbox::new(Arc::clone(&store), unread, realtime);
        let retention = NotificationRetention::new(store);

        let (queue, receiver) = FanoutQueue::new(config.queue_capacity);
        let worker = FanoutWorker::new(fanout.clone());

        (
            Self {
                fanout,
                queue,
                inbox,
                preferences,
                retention,
            },
            FanoutBackground { worker, receiver },
        )
    }
}

impl FanoutBackground {
    /// Spawn the worker on the current runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.worker.run(self.receiver))
    }
}
