use std::num::NonZeroU32;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use itemhub_core::types::Timestamp;
use itemhub_db::connection::{redact_uri, ConnectionState, ConnectionStatus};

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database is connected, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Connection state: `connecting`, `connected` or `disconnected`.
    pub database: &'static str,
    pub timestamp: Timestamp,
    pub uptime_secs: u64,
}

/// GET /health -- returns service and database health. Always 200.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_state = state.connection.status().state;

    let status = if db_state == ConnectionState::Connected {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database: db_state.as_str(),
        timestamp: itemhub_core::types::now(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Debug response payload.
#[derive(Serialize)]
pub struct DebugResponse {
    pub version: &'static str,
    pub uptime_secs: u64,
    pub connection: ConnectionStatus,
    /// Store backend name, `None` while not connected.
    pub backend: Option<&'static str>,
    /// Whether a ping round trip succeeded, `None` while not connected.
    pub reachable: Option<bool>,
    /// Number of stored items, `None` when it could not be counted.
    pub item_count: Option<u64>,
    pub settings: DebugSettings,
}

/// Effective settings that explain the service's behaviour.
#[derive(Serialize)]
pub struct DebugSettings {
    /// Connection string with credentials removed.
    pub database_target: String,
    pub retry_delay_secs: u64,
    pub max_connect_attempts: Option<u32>,
    pub require_description: bool,
}

/// GET /api/debug -- connection status snapshot and item count.
pub async fn debug_info(State(state): State<AppState>) -> Json<DebugResponse> {
    let connection = state.connection.status();

    let (backend, reachable, item_count) = match state.connection.store().await {
        Some(store) => {
            let reachable = match store.ping().await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "Debug: database ping failed");
                    false
                }
            };
            let count = match store.count().await {
                Ok(n) => Some(n),
                Err(e) => {
                    tracing::warn!(error = %e, "Debug: failed to count items");
                    None
                }
            };
            (Some(store.backend()), Some(reachable), count)
        }
        None => (None, None, None),
    };

    let db = &state.config.database;
    Json(DebugResponse {
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        connection,
        backend,
        reachable,
        item_count,
        settings: DebugSettings {
            database_target: redact_uri(&db.uri),
            retry_delay_secs: db.retry_delay_secs.get(),
            max_connect_attempts: db.max_connect_attempts.map(NonZeroU32::get),
            require_description: state.config.items.require_description,
        },
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
