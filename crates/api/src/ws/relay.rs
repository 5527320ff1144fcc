//! Pub/sub to WebSocket relay.
//!
//! Pattern-subscribes to every per-user notification channel and forwards
//! each payload verbatim as a text frame to that user's open sockets. The
//! subscription is re-established after a delay if it fails or ends.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::StreamExt;
use stackit_core::channels::{parse_user_channel, USER_CHANNEL_PATTERN};
use stackit_events::CacheStore;
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

/// Wait before re-subscribing after a failure.
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// Run the relay until `cancel` is triggered.
pub async fn run_relay(
    cache: Arc<dyn CacheStore>,
    ws_manager: Arc<WsManager>,
    cancel: CancellationToken,
) {
    loop {
        match cache.subscribe_pattern(USER_CHANNEL_PATTERN).await {
            Ok(mut stream) => {
                tracing::info!(pattern = USER_CHANNEL_PATTERN, "Real-time relay subscribed");
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::info!("Real-time relay stopping");
                            return;
                        }
                        next = stream.next() => {
                            let Some(message) = next else {
                                tracing::warn!("Real-time subscription ended");
                                break;
                            };
                            let Some(user_id) = parse_user_channel(&message.channel) else {
                                tracing::debug!(channel = %message.channel, "Ignoring message on unknown channel");
                                continue;
                            };
                            let delivered = ws_manager
                                .send_to_user(user_id, Message::Text(message.payload.into()))
                                .await;
                            tracing::trace!(user_id, delivered, "Relayed real-time message");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Real-time relay failed to subscribe");
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Real-time relay stopping");
                return;
            }
            _ = tokio::time::sleep(RESUBSCRIBE_DELAY) => {}
        }
    }
}
