use itemhub_core::error::CoreError;
use itemhub_core::items::{
    coerce_quantity, ItemFields, ItemRules, DEFAULT_IS_ACTIVE, DEFAULT_QUANTITY,
};
use itemhub_core::types::{ItemId, Timestamp};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::store::StoreError;

/// An item record as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for create and update: any JSON object.
///
/// Values are kept as raw JSON so type coercion happens in one place
/// ([`ItemFields::from_json`]) instead of failing deserialization. Arrays and
/// scalars are rejected at deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct ItemPayload(pub Map<String, Value>);

impl ItemPayload {
    pub fn into_fields(self, rules: &ItemRules) -> Result<ItemFields, CoreError> {
        ItemFields::from_json(&self.0, rules)
    }
}

/// A document in the `items` collection.
///
/// `description`, `quantity`, `isActive` and `updatedAt` are lenient on read
/// so that documents written by older deployments still load: a missing or
/// `null` quantity reads as 0 and a fractional one is truncated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "isActive", default = "default_is_active")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<BsonDateTime>,
}

impl ItemDocument {
    /// Build a fresh document for insertion.
    pub fn new(fields: &ItemFields, now: Timestamp) -> Self {
        let at = to_bson_date(now);
        Self {
            id: ObjectId::new(),
            name: fields.name.clone(),
            description: Some(fields.description.clone()),
            quantity: fields.quantity,
            category: fields.category.clone(),
            price: fields.price,
            is_active: fields.is_active,
            created_at: at,
            updated_at: Some(at),
        }
    }

    pub fn into_item(self) -> Result<Item, StoreError> {
        let hex = self.id.to_hex();
        let created_at = from_bson_date(&hex, self.created_at)?;
        let updated_at = match self.updated_at {
            Some(at) => from_bson_date(&hex, at)?,
            None => created_at,
        };

        Ok(Item {
            id: item_id_from_object_id(self.id)?,
            name: self.name,
            description: self.description.unwrap_or_default(),
            quantity: self.quantity,
            category: self.category,
            price: self.price,
            is_active: self.is_active,
            created_at,
            updated_at,
        })
    }
}

fn default_is_active() -> bool {
    DEFAULT_IS_ACTIVE
}

/// Read a stored quantity written as an int32, int64 or double.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StoredNumber {
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<StoredNumber>::deserialize(deserializer)? {
        Some(StoredNumber::Int(n)) => n,
        Some(StoredNumber::Float(f)) => coerce_quantity(&Value::from(f)),
        None => DEFAULT_QUANTITY,
    })
}

pub fn item_id_from_object_id(oid: ObjectId) -> Result<ItemId, StoreError> {
    let hex = oid.to_hex();
    ItemId::parse(&hex).map_err(|_| StoreError::InvalidObjectId(hex))
}

pub fn object_id(id: &ItemId) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id.as_str()).map_err(|e| StoreError::InvalidObjectId(e.to_string()))
}

pub fn to_bson_date(ts: Timestamp) -> BsonDateTime {
    BsonDateTime::from_millis(ts.timestamp_millis())
}

fn from_bson_date(id: &str, at: BsonDateTime) -> Result<Timestamp, StoreError> {
    chrono::DateTime::from_timestamp_millis(at.timestamp_millis()).ok_or_else(|| {
        StoreError::CorruptDocument {
            id: id.to_string(),
            reason: format!("timestamp out of range: {}", at.timestamp_millis()),
        }
    })
}
