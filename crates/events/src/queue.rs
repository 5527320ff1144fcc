//! Fire-and-forget hand-off from request handlers to the fan-out.
//!
//! Handlers call [`FanoutQueue::enqueue`] after their content write
//! commits and return immediately. A single [`FanoutWorker`] drains the
//! queue. The channel is bounded: when it is full, `enqueue` waits, so
//! events are never silently dropped. Once every queue handle is gone the
//! worker finishes what is buffered and exits.

use stackit_core::content::ContentEvent;
use tokio::sync::mpsc;

use crate::fanout::NotificationFanout;

/// Sending half of the fan-out queue. Cheap to clone.
#[derive(Clone)]
pub struct FanoutQueue {
    sender: mpsc::Sender<ContentEvent>,
}

impl FanoutQueue {
    /// Create a queue with the given capacity and its receiving half.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ContentEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Queue an event for fan-out.
    ///
    /// Returns `false` if the worker has already shut down.
    pub async fn enqueue(&self, event: ContentEvent) -> bool {
        let kind = event.kind_name();
        match self.sender.send(event).await {
            Ok(()) => true,
            Err(_) => {
                tracing::error!(event = kind, "Fan-out worker is gone, event dropped");
                false
            }
        }
    }
}

/// Consumes queued events and runs them through [`NotificationFanout`].
pub struct FanoutWorker {
    fanout: NotificationFanout,
}

impl FanoutWorker {
    pub fn new(fanout: NotificationFanout) -> Self {
        Self { fanout }
    }

    /// Run until every [`FanoutQueue`] handle has been dropped and the
    /// buffer is empty.
    pub async fn run(self, mut receiver: mpsc::Receiver<ContentEvent>) {
        tracing::info!("Fan-out worker started");
        while let Some(event) = receiver.recv().await {
            let created = self.fanout.on_content_created(&event).await;
            tracing::debug!(
                event = event.kind_name(),
                notifications = created.len(),
                "Queued event processed"
            );
        }
        tracing::info!("Fan-out queue closed, worker shutting down");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::memory::{MemoryCache, MemoryStore};
    use crate::preferences::PreferenceGate;
    use crate::realtime::RealtimePublisher;
    use crate::unread::UnreadCounter;

    fn fanout(store: &Arc<MemoryStore>) -> NotificationFanout {
        let cache = Arc::new(MemoryCache::new());
        NotificationFanout::new(
            store.clone(),
            PreferenceGate::new(store.clone()),
            UnreadCounter::new(store.clone(), cache.clone(), Duration::from_secs(300)),
            RealtimePublisher::new(cache),
        )
    }

    #[tokio::test]
    async fn worker_drains_buffer_before_exiting() {
        let store = Arc::new(MemoryStore::new());
        let alice = store.add_user("alice");
        let bob = store.add_user("bob");
        let question = store.add_question(alice);

        let (queue, receiver) = FanoutQueue::new(8);
        for answer_id in 0..3 {
            assert!(
                queue
                    .enqueue(ContentEvent::QuestionAnswered {
                        actor_id: bob,
                        question_id: question,
                        answer_id: 100 + answer_id,
                        body: "answer".into(),
                    })
                    .await
            );
        }
        drop(queue);

        FanoutWorker::new(fanout(&store)).run(receiver).await;
        assert_eq!(store.notifications_for(alice).len(), 3);
    }

    #[tokio::test]
    async fn enqueue_after_worker_exit_reports_failure() {
        let (queue, receiver) = FanoutQueue::new(1);
        drop(receiver);

        let accepted = queue
            .enqueue(ContentEvent::ItemVoted {
                actor_id: 1,
                question_id: 2,
                target: stackit_core::content::ItemRef::Question(2),
                direction: stackit_core::content::VoteDirection::Up,
            })
            .await;
        assert!(!accepted);
    }
}
