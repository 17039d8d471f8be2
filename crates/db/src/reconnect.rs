//! Fixed-delay connection bootstrap.
//!
//! [`connect_loop`] keeps calling a [`StoreConnector`] until it succeeds, the
//! attempt limit is reached, or the [`CancellationToken`] is triggered. The
//! delay between attempts never grows.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::store::{ItemStore, StoreConnector, StoreError};

/// Tunable parameters for the bootstrap loop.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Wait between a failed attempt and the next one.
    pub delay: Duration,
    /// Give up after this many attempts. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

impl ReconnectConfig {
    /// Whether another attempt is allowed after `attempts` have been made.
    pub fn allows_attempt(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }
}

/// How the bootstrap loop ended.
pub enum ConnectOutcome {
    Connected {
        store: Arc<dyn ItemStore>,
        attempts: u32,
    },
    GaveUp {
        attempts: u32,
    },
    Cancelled {
        attempts: u32,
    },
}

/// Connect with a fixed delay between attempts.
///
/// `on_failure` is called with the attempt number and error after every
/// failed attempt, before the delay.
pub async fn connect_loop(
    connector: &dyn StoreConnector,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
    mut on_failure: impl FnMut(u32, &StoreError),
) -> ConnectOutcome {
    let mut attempt = 0u32;

    loop {
        if !config.allows_attempt(attempt) {
            tracing::error!(
                target_db = %connector.target(),
                attempts = attempt,
                "Giving up on database connection",
            );
            return ConnectOutcome::GaveUp { attempts: attempt };
        }

        attempt += 1;
        tracing::info!(
            target_db = %connector.target(),
            attempt,
            "Connecting to database",
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Database connect cancelled");
                return ConnectOutcome::Cancelled { attempts: attempt };
            }
            result = connector.connect() => {
                match result {
                    Ok(store) => {
                        tracing::info!(
                            target_db = %connector.target(),
                            attempt,
                            backend = store.backend(),
                            "Connected to database",
                        );
                        return ConnectOutcome::Connected { store, attempts: attempt };
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            retry_in_ms = config.delay.as_millis() as u64,
                            "Database connect attempt {attempt} failed",
                        );
                        on_failure(attempt, &e);
                    }
                }
            }
        }

        if !config.allows_attempt(attempt) {
            continue;
        }

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return ConnectOutcome::Cancelled { attempts: attempt },
            _ = tokio::time::sleep(config.delay) => {}
        }
    }
}
