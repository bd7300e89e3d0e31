use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;

use crate::{
    error::{AppError, Result},
    models::{
        booking::Booking,
        client::{Client, ClientPatch},
    },
    state::AppState,
};

/// Lists all clients.
#[axum::debug_handler]
pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>> {
    Ok(Json(state.store.list_clients().await?))
}

/// Gets a single client.
#[axum::debug_handler]
pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<Client>> {
    let client = state
        .store
        .find_client(client_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(client))
}

/// Gets the booking attached to a client.
#[axum::debug_handler]
pub async fn get_client_booking(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<Booking>> {
    let booking = state
        .store
        .find_booking_by_client(client_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(booking))
}

/// Updates a client's contact details.
#[axum::debug_handler]
pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(patch): Json<ClientPatch>,
) -> Result<Json<Client>> {
    patch.validate()?;
    let client = state
        .store
        .update_client(client_id, patch)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!("✏️ Client {} updated", client.id);
    Ok(Json(client))
}

/// Deletes a client together with its booking.
#[axum::debug_handler]
pub async fn delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<StatusCode> {
    if !state.store.delete_client(client_id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!("🗑️ Client {} deleted", client_id);
    Ok(StatusCode::NO_CONTENT)
}
