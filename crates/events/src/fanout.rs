//! Content-event to notification fan-out.
//!
//! [`NotificationFanout::on_content_created`] derives the recipients of one
//! [`ContentEvent`]: the direct recipient implied by the event kind, then
//! every user `@mentioned` in the body. Each candidate goes through the
//! same pipeline:
//!
//! 1. skip the actor themselves;
//! 2. skip if the recipient disabled the category;
//! 3. insert the notification row;
//! 4. invalidate the recipient's unread count;
//! 5. publish a `new_notification` real-time message.
//!
//! Candidates are independent. A failure for one is logged and the rest
//! proceed; nothing is returned to the caller except the ids created.

use std::collections::HashSet;
use std::sync::Arc;

use stackit_core::content::{ContentEvent, ContentRefs, ItemRef, VoteDirection};
use stackit_core::mentions::extract_mentions;
use stackit_core::notification::{
    answer_message, comment_message, mention_message, vote_message, NotificationType,
    UNKNOWN_ACTOR,
};
use stackit_core::types::DbId;
use stackit_db::models::notification::CreateNotification;

use crate::error::{FanoutError, StoreError};
use crate::preferences::PreferenceGate;
use crate::realtime::{RealtimeMessage, RealtimePublisher};
use crate::store::NotificationStore;
use crate::unread::UnreadCounter;

/// Turns content events into stored, cached and published notifications.
#[derive(Clone)]
pub struct NotificationFanout {
    store: Arc<dyn NotificationStore>,
    preferences: PreferenceGate,
    unread: UnreadCounter,
    realtime: RealtimePublisher,
}

impl NotificationFanout {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        preferences: PreferenceGate,
        unread: UnreadCounter,
        realtime: RealtimePublisher,
    ) -> Self {
        Self {
            store,
            preferences,
            unread,
            realtime,
        }
    }

    /// Create every notification `event` implies.
    ///
    /// Returns the ids of the notifications actually created, direct
    /// recipient first, then mentions in username order. Never fails.
    pub async fn on_content_created(&self, event: &ContentEvent) -> Vec<DbId> {
        let actor_id = event.actor_id();
        let actor_name = self.actor_name(actor_id).await;
        let refs = event.refs();

        let mut created = Vec::new();
        let mut notified: HashSet<DbId> = HashSet::new();

        // Direct recipient.
        match self.direct_recipient(event).await {
            Ok(Some(recipient)) => {
                let message = direct_message(event, &actor_name);
                if let Some(id) = self
                    .notify(recipient, actor_id, event.category(), message, refs)
                    .await
                {
                    created.push(id);
                    notified.insert(recipient);
                }
            }
            Ok(None) => {
                if !matches!(event, ContentEvent::UserMentioned { .. }) {
                    let err = FanoutError::UnresolvedRecipient(format!(
                        "{} target has no author",
                        event.kind_name()
                    ));
                    tracing::warn!(actor_id, error = %err, "Skipping direct notification");
                }
            }
            Err(e) => {
                tracing::warn!(
                    actor_id,
                    event = event.kind_name(),
                    error = %e,
                    "Failed to resolve direct recipient"
                );
            }
        }

        // Body mentions.
        let mention_text = mention_message(&actor_name, event.content_kind());
        for username in extract_mentions(event.body()) {
            let recipient = match self.store.find_user_id_by_username(&username).await {
                Ok(Some(id)) => id,
                Ok(None) => {
                    let err = FanoutError::UnresolvedRecipient(username.clone());
                    tracing::debug!(actor_id, error = %err, "Ignoring mention of unknown user");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        actor_id,
                        username = %username,
                        error = %e,
                        "Failed to resolve mentioned user"
                    );
                    continue;
                }
            };

            if notified.contains(&recipient) {
                tracing::debug!(
                    user_id = recipient,
                    "Mentioned user already notified for this event"
                );
                continue;
            }

            if let Some(id) = self
                .notify(
                    recipient,
                    actor_id,
                    NotificationType::Mention,
                    mention_text.clone(),
                    refs,
                )
                .await
            {
                created.push(id);
                notified.insert(recipient);
            }
        }

        tracing::info!(
            actor_id,
            event = event.kind_name(),
            created = created.len(),
            "Content event fanned out"
        );
        created
    }

    /// Run one candidate through gate, insert, invalidate and publish.
    async fn notify(
        &self,
        recipient: DbId,
        actor_id: DbId,
        category: NotificationType,
        message: String,
        refs: ContentRefs,
    ) -> Option<DbId> {
        if recipient == actor_id {
            tracing::debug!(user_id = recipient, category = %category, "Suppressing self-notification");
            return None;
        }

        if !self.preferences.is_enabled(recipient, category).await {
            tracing::debug!(user_id = recipient, category = %category, "Category disabled by recipient");
            return None;
        }

        let input = CreateNotification {
            user_id: recipient,
            notification_type: category,
            message,
            question_id: refs.question_id,
            answer_id: refs.answer_id,
            comment_id: refs.comment_id,
            actor_user_id: Some(actor_id),
        };

        let notification = match self.store.insert_notification(&input).await {
            Ok(n) => n,
            Err(source) => {
                let err = FanoutError::NotificationWriteFailure {
                    user_id: recipient,
                    source,
                };
                tracing::error!(category = %category, error = %err, "Notification not created");
                return None;
            }
        };

        let id = notification.id;
        self.unread.invalidate(recipient).await;
        self.realtime
            .publish(recipient, &RealtimeMessage::new_notification(notification))
            .await;

        tracing::debug!(user_id = recipient, notification_id = id, category = %category, "Notification created");
        Some(id)
    }

    /// The author the event addresses directly, if any.
    async fn direct_recipient(&self, event: &ContentEvent) -> Result<Option<DbId>, StoreError> {
        match event {
            ContentEvent::QuestionAnswered { question_id, .. } => {
                self.store.find_question_author(*question_id).await
            }
            ContentEvent::ItemCommented { target, .. } | ContentEvent::ItemVoted { target, .. } => {
                self.item_author(*target).await
            }
            ContentEvent::UserMentioned {
                mentioned_user_id, ..
            } => Ok(*mentioned_user_id),
        }
    }

    async fn item_author(&self, item: ItemRef) -> Result<Option<DbId>, StoreError> {
        match item {
            ItemRef::Question(id) => self.store.find_question_author(id).await,
            ItemRef::Answer(id) => self.store.find_answer_author(id).await,
        }
    }

    async fn actor_name(&self, actor_id: DbId) -> String {
        match self.store.find_username(actor_id).await {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_ACTOR.to_string(),
            Err(e) => {
                tracing::warn!(actor_id, error = %e, "Failed to resolve actor name");
                UNKNOWN_ACTOR.to_string()
            }
        }
    }
}

/// Message text for the direct-recipient notification.
fn direct_message(event: &ContentEvent, actor: &str) -> String {
    match event {
        ContentEvent::QuestionAnswered { .. } => answer_message(actor),
        ContentEvent::ItemCommented { target, .. } => comment_message(actor, target.kind()),
        ContentEvent::UserMentioned { .. } => mention_message(actor, event.content_kind()),
        ContentEvent::ItemVoted {
            target, direction, ..
        } => vote_message(actor, *direction == VoteDirection::Up, target.kind()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
