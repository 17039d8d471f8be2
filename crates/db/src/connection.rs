//! Database connection manager.
//!
//! [`ConnectionManager`] owns the current store handle and publishes a
//! [`ConnectionStatus`] snapshot over a [`tokio::sync::watch`] channel. It is
//! created once at startup and shared through application state; the
//! bootstrap task attaches the store once a connection succeeds. Until then
//! [`ConnectionManager::store`] returns `None` so callers can fail fast.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use itemhub_core::types::Timestamp;
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;

use crate::reconnect::{connect_loop, ConnectOutcome, ReconnectConfig};
use crate::repositories::MongoItemRepo;
use crate::store::{ItemStore, StoreConnector, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Bootstrap in progress; no store yet.
    Connecting,
    Connected,
    /// Bootstrap gave up or was cancelled before connecting.
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Point-in-time view of the connection.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// Connection attempts made so far.
    pub attempts: u32,
    pub last_error: Option<String>,
    pub connected_at: Option<Timestamp>,
}

impl ConnectionStatus {
    fn connecting() -> Self {
        Self {
            state: ConnectionState::Connecting,
            attempts: 0,
            last_error: None,
            connected_at: None,
        }
    }
}

pub struct ConnectionManager {
    store: RwLock<Option<Arc<dyn ItemStore>>>,
    status: watch::Sender<ConnectionStatus>,
}

impl ConnectionManager {
    /// A manager with no store, in the `connecting` state.
    pub fn new() -> Arc<Self> {
        let (status, _) = watch::channel(ConnectionStatus::connecting());
        Arc::new(Self {
            store: RwLock::new(None),
            status,
        })
    }

    /// A manager that is already connected to `store`.
    pub fn with_store(store: Arc<dyn ItemStore>) -> Arc<Self> {
        let (status, _) = watch::channel(ConnectionStatus {
            state: ConnectionState::Connected,
            attempts: 0,
            last_error: None,
            connected_at: Some(itemhub_core::types::now()),
        });
        Arc::new(Self {
            store: RwLock::new(Some(store)),
            status,
        })
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    /// Receive every status change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.status.borrow().state == ConnectionState::Connected
    }

    /// The current store, or `None` while not connected.
    pub async fn store(&self) -> Option<Arc<dyn ItemStore>> {
        self.store.read().await.clone()
    }

    /// Install a connected store.
    pub async fn attach(&self, store: Arc<dyn ItemStore>) {
        *self.store.write().await = Some(store);
        self.status.send_modify(|s| {
            s.state = ConnectionState::Connected;
            s.last_error = None;
            s.connected_at = Some(itemhub_core::types::now());
        });
    }

    /// Drop the store and mark the connection as down.
    pub async fn detach(&self, reason: impl Into<String>) {
        *self.store.write().await = None;
        let reason = reason.into();
        self.status.send_modify(|s| {
            s.state = ConnectionState::Disconnected;
            s.last_error = Some(reason);
            s.connected_at = None;
        });
    }

    /// Spawn the bootstrap loop as a background task.
    pub fn spawn(
        self: &Arc<Self>,
        connector: Arc<dyn StoreConnector>,
        config: ReconnectConfig,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run(connector, config, cancel))
    }

    /// Run the bootstrap loop to completion, updating the status as it goes.
    pub async fn run(
        self: Arc<Self>,
        connector: Arc<dyn StoreConnector>,
        config: ReconnectConfig,
        cancel: CancellationToken,
    ) {
        self.status.send_modify(|s| s.state = ConnectionState::Connecting);

        let outcome = connect_loop(connector.as_ref(), &config, &cancel, |attempt, err| {
            self.status.send_modify(|s| {
                s.attempts = attempt;
                s.last_error = Some(err.to_string());
            });
        })
        .await;

        match outcome {
            ConnectOutcome::Connected { store, attempts } => {
                self.status.send_modify(|s| s.attempts = attempts);
                self.attach(store).await;
            }
            // The last connect error stays in the status for the debug route.
            ConnectOutcome::GaveUp { attempts } | ConnectOutcome::Cancelled { attempts } => {
                self.status.send_modify(|s| {
                    s.attempts = attempts;
                    s.state = ConnectionState::Disconnected;
                });
            }
        }
    }
}

/// Connects to MongoDB and wraps the database in a [`MongoItemRepo`].
#[derive(Debug, Clone)]
pub struct MongoConnector {
    uri: String,
    database: Option<String>,
    timeout: Duration,
}

impl MongoConnector {
    /// `database` overrides the database named in the URI; `timeout` bounds
    /// both socket connect and server selection for a single attempt.
    pub fn new(uri: impl Into<String>, database: Option<String>, timeout: Duration) -> Self {
        Self {
            uri: uri.into(),
            database,
            timeout,
        }
    }
}

#[async_trait]
impl StoreConnector for MongoConnector {
    async fn connect(&self) -> Result<Arc<dyn ItemStore>, StoreError> {
        let db = crate::connect(&self.uri, self.database.as_deref(), self.timeout).await?;
        Ok(Arc::new(MongoItemRepo::new(db)))
    }

    fn target(&self) -> String {
        redact_uri(&self.uri)
    }
}

/// Strip credentials from a connection string.
pub fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://***@{}", &rest[at + 1..]),
        None => uri.to_string(),
    }
}
