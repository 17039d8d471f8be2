//! Repository for the `items` collection.

use async_trait::async_trait;
use futures::TryStreamExt;
use itemhub_core::items::ItemFields;
use itemhub_core::types::ItemId;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::models::item::{object_id, to_bson_date, Item, ItemDocument};
use crate::store::{ItemStore, StoreError};

/// Collection holding item documents.
pub const COLLECTION: &str = "items";

/// Provides CRUD operations for items stored in MongoDB.
#[derive(Debug, Clone)]
pub struct MongoItemRepo {
    db: Database,
    items: Collection<ItemDocument>,
}

impl MongoItemRepo {
    pub fn new(db: Database) -> Self {
        let items = db.collection::<ItemDocument>(COLLECTION);
        Self { db, items }
    }
}

#[async_trait]
impl ItemStore for MongoItemRepo {
    /// List all items, newest first. `_id` breaks ties between items created
    /// in the same millisecond.
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let cursor = self
            .items
            .find(doc! {})
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?;
        let docs: Vec<ItemDocument> = cursor.try_collect().await?;
        docs.into_iter().map(ItemDocument::into_item).collect()
    }

    /// Find an item by its ID.
    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        self.items
            .find_one(doc! { "_id": object_id(id)? })
            .await?
            .map(ItemDocument::into_item)
            .transpose()
    }

    /// Insert a new item, returning the stored record.
    async fn create(&self, fields: &ItemFields) -> Result<Item, StoreError> {
        let document = ItemDocument::new(fields, itemhub_core::types::now());
        self.items.insert_one(&document).await?;
        document.into_item()
    }

    /// Overwrite an item's fields by ID, returning the updated record.
    async fn update(
        &self,
        id: &ItemId,
        fields: &ItemFields,
    ) -> Result<Option<Item>, StoreError> {
        let updated_at = to_bson_date(itemhub_core::types::now());
        let mut set = doc! {
            "name": fields.name.as_str(),
            "description": fields.description.as_str(),
            "quantity": fields.quantity,
            "isActive": fields.is_active,
            "updatedAt": updated_at,
        };
        // Optional fields left out of the payload are removed, not kept.
        let mut unset = Document::new();
        match &fields.category {
            Some(category) => set.insert("category", category.as_str()),
            None => unset.insert("category", ""),
        };
        match fields.price {
            Some(price) => set.insert("price", price),
            None => unset.insert("price", ""),
        };

        let mut update = doc! { "$set": set };
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }

        self.items
            .find_one_and_update(doc! { "_id": object_id(id)? }, update)
            .return_document(ReturnDocument::After)
            .await?
            .map(ItemDocument::into_item)
            .transpose()
    }

    /// Delete an item by ID. Returns `true` if a document was deleted.
    async fn delete(&self, id: &ItemId) -> Result<bool, StoreError> {
        let result = self
            .items
            .delete_one(doc! { "_id": object_id(id)? })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.items.count_documents(doc! {}).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.db).await
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
