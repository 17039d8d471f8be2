//! Handlers for the item collection.
//!
//! Every handler resolves the store first, so requests made while the
//! database is not connected fail with 503 before the identifier or body is
//! looked at and before anything is written.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use itemhub_core::error::CoreError;
use itemhub_core::types::ItemId;
use itemhub_db::models::item::ItemPayload;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Body returned by a successful delete.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn not_found(id: &ItemId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Item",
        id: id.to_string(),
    })
}

/// GET /items
///
/// List all items, newest first.
pub async fn list_items(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let store = state.store().await?;
    let items = store.list().await?;
    Ok(Json(items))
}

/// GET /items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let store = state.store().await?;
    let id = ItemId::parse(&id)?;

    let item = store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;

    Ok(Json(item))
}

/// POST /items
///
/// Create an item. `quantity` is coerced to an integer (0 when invalid).
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<ItemPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let store = state.store().await?;
    let Json(payload) = payload?;
    let fields = payload.into_fields(&state.config.items)?;

    let item = store.create(&fields).await?;

    tracing::info!(item_id = %item.id, name = %item.name, "Item created");

    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /items/{id}
///
/// Overwrite name, description and quantity. Omitted fields are not kept:
/// the payload is validated exactly like a create.
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ItemPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let store = state.store().await?;
    let id = ItemId::parse(&id)?;
    let Json(payload) = payload?;
    let fields = payload.into_fields(&state.config.items)?;

    let item = store
        .update(&id, &fields)
        .await?
        .ok_or_else(|| not_found(&id))?;

    tracing::info!(item_id = %item.id, "Item updated");

    Ok(Json(item))
}

/// DELETE /items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let store = state.store().await?;
    let id = ItemId::parse(&id)?;

    if !store.delete(&id).await? {
        return Err(not_found(&id));
    }

    tracing::info!(item_id = %id, "Item deleted");

    Ok(Json(MessageResponse {
        message: "Item deleted successfully",
    }))
}
