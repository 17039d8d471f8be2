//! Data access layer for item records.
//!
//! The [`store::ItemStore`] trait is the seam between the HTTP handlers and
//! the database; [`connection::ConnectionManager`] decides whether a store is
//! available at all.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

pub mod connection;
pub mod models;
pub mod reconnect;
pub mod repositories;
pub mod store;

use store::StoreError;

/// Database used when neither the URI nor the configuration names one.
pub const DEFAULT_DATABASE: &str = "mydatabase";

/// Open a client and verify the server answers.
///
/// `database` overrides the database named in the URI. `timeout` bounds
/// both the TCP connect and server selection so a down server fails the
/// attempt quickly instead of after the driver's 30 second default.
pub async fn connect(
    uri: &str,
    database: Option<&str>,
    timeout: Duration,
) -> Result<Database, StoreError> {
    let mut options = ClientOptions::parse(uri).await?;
    options.app_name = Some("itemhub".to_string());
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);

    let name = database
        .map(str::to_string)
        .or_else(|| options.default_database.clone())
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

    let client = Client::with_options(options)?;
    let db = client.database(&name);
    health_check(&db).await?;

    tracing::debug!(database = %name, "Database ping succeeded");
    Ok(db)
}

/// Run a `ping` command against the database.
pub async fn health_check(db: &Database) -> Result<(), StoreError> {
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}
