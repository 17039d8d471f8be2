//! Repository layer.
//!
//! Each repository implements [`ItemStore`](crate::store::ItemStore) over a
//! different backend.

pub mod item_repo;
pub mod memory_item_repo;

pub use item_repo::MongoItemRepo;
pub use memory_item_repo::InMemoryItemRepo;
