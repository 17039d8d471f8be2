//! Store abstraction for item records.
//!
//! [`ItemStore`] is the data access seam: handlers hold an
//! `Arc<dyn ItemStore>` obtained from the connection manager, so tests can
//! substitute the in-memory repository for MongoDB.

use std::sync::Arc;

use async_trait::async_trait;
use itemhub_core::items::ItemFields;
use itemhub_core::types::ItemId;
use mongodb::error::ErrorKind;

use crate::models::item::Item;

/// Errors raised by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database cannot be reached (server selection failed).
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// Any other driver failure.
    #[error("Database error: {0}")]
    Driver(mongodb::error::Error),

    /// A stored document could not be mapped to an item.
    #[error("Corrupt document {id}: {reason}")]
    CorruptDocument { id: String, reason: String },

    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { message, .. } => StoreError::Unavailable(message.clone()),
            _ => StoreError::Driver(err),
        }
    }
}

/// CRUD operations over the item collection.
///
/// Every method is a single store call with no retries. Identifiers arrive
/// pre-validated as [`ItemId`].
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items, newest first by `createdAt`.
    async fn list(&self) -> Result<Vec<Item>, StoreError>;

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, StoreError>;

    /// Insert a new item, returning it with its generated id and timestamps.
    async fn create(&self, fields: &ItemFields) -> Result<Item, StoreError>;

    /// Overwrite name, description and quantity and refresh `updatedAt`.
    /// Returns the post-update item, or `None` if no item has this id.
    async fn update(&self, id: &ItemId, fields: &ItemFields)
        -> Result<Option<Item>, StoreError>;

    /// Returns `true` if an item was deleted.
    async fn delete(&self, id: &ItemId) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Round trip to the backing store.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for status reporting.
    fn backend(&self) -> &'static str;
}

/// Opens a store. One call is one connection attempt.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ItemStore>, StoreError>;

    /// Human-readable connection target, safe to log (no credentials).
    fn target(&self) -> String;
}
