//! Item models.
//!
//! - [`item::Item`]: the record as exposed on the wire
//! - [`item::ItemDocument`]: the record as stored in MongoDB
//! - [`item::ItemPayload`]: the create/update request body
pub mod item;
