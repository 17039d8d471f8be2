use std::sync::Arc;
use std::time::Instant;

use itemhub_db::connection::ConnectionManager;
use itemhub_db::store::ItemStore;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is `Copy`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection manager; owns the store handle.
    pub connection: Arc<ConnectionManager>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(connection: Arc<ConnectionManager>, config: ServerConfig) -> Self {
        Self {
            connection,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// The connected store, or [`AppError::StoreUnavailable`] without waiting.
    pub async fn store(&self) -> AppResult<Arc<dyn ItemStore>> {
        self.connection
            .store()
            .await
            .ok_or(AppError::StoreUnavailable)
    }
}
