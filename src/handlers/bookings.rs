use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;

use crate::{
    error::{AppError, Result},
    models::booking::{Booking, BookingPatch},
    state::AppState,
};

/// Lists all bookings.
#[axum::debug_handler]
pub async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>> {
    Ok(Json(state.store.list_bookings().await?))
}

/// Gets a single booking.
#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>> {
    let booking = state
        .store
        .find_booking(booking_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(booking))
}

/// Updates booking details.
#[axum::debug_handler]
pub async fn update_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
    Json(patch): Json<BookingPatch>,
) -> Result<Json<Booking>> {
    patch.validate()?;
    let booking = state
        .store
        .update_booking(booking_id, patch)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!("✏️ Booking {} updated", booking.id);
    Ok(Json(booking))
}

/// Deletes a booking. The client stays.
#[axum::debug_handler]
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<StatusCode> {
    if !state.store.delete_booking(booking_id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!("🗑️ Booking {} deleted", booking_id);
    Ok(StatusCode::NO_CONTENT)
}
