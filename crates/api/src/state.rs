use std::sync::Arc;

use stackit_events::CacheStore;

use crate::config::ServerConfig;
use crate::notifications::NotificationServices;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: stackit_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Cache and pub/sub backend (Redis or in-process).
    pub cache: Arc<dyn CacheStore>,
    /// Fan-out queue, inbox and preference services.
    pub notifications: NotificationServices,
}
