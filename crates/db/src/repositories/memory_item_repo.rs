//! In-process item store.
//!
//! Mirrors [`MongoItemRepo`](super::MongoItemRepo) semantics (ObjectId-format
//! identifiers, newest-first ordering, millisecond timestamps) without a
//! database. Used as the fake store in tests.

use async_trait::async_trait;
use itemhub_core::items::ItemFields;
use itemhub_core::types::ItemId;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::models::item::{item_id_from_object_id, Item};
use crate::store::{ItemStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryItemRepo {
    /// Items in insertion order.
    items: RwLock<Vec<Item>>,
}

impl InMemoryItemRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemRepo {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let mut items = self.items.read().await.clone();
        // Reverse first so the stable sort keeps later inserts ahead on ties.
        items.reverse();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| &item.id == id).cloned())
    }

    async fn create(&self, fields: &ItemFields) -> Result<Item, StoreError> {
        let now = itemhub_core::types::now();
        let item = Item {
            id: item_id_from_object_id(ObjectId::new())?,
            name: fields.name.clone(),
            description: fields.description.clone(),
            quantity: fields.quantity,
            category: fields.category.clone(),
            price: fields.price,
            is_active: fields.is_active,
            created_at: now,
            updated_at: now,
        };
        self.items.write().await.push(item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        id: &ItemId,
        fields: &ItemFields,
    ) -> Result<Option<Item>, StoreError> {
        let mut items = self.items.write().await;
        let Some(item) = items.iter_mut().find(|item| &item.id == id) else {
            return Ok(None);
        };

        item.name = fields.name.clone();
        item.description = fields.description.clone();
        item.quantity = fields.quantity;
        item.category = fields.category.clone();
        item.price = fields.price;
        item.is_active = fields.is_active;
        item.updated_at = itemhub_core::types::now();
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: &ItemId) -> Result<bool, StoreError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| &item.id != id);
        Ok(items.len() < before)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.items.read().await.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
