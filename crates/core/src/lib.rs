//! Domain building blocks shared by the item store and the HTTP API.
//!
//! Nothing in here talks to the database or the network: identifier
//! parsing, timestamps, the error taxonomy, and the write rules applied to
//! incoming item payloads.

pub mod error;
pub mod items;
pub mod types;
