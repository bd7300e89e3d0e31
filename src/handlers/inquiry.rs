use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    models::{
        booking::{BookingStatus, NewBooking, ServiceFlags},
        client::NewClient,
    },
    services::inquiry as inquiry_service,
    state::AppState,
    validation::{
        auth::validate_name,
        inquiry::{validate_event_date, validate_event_time, validate_phone},
    },
};

/// The public inquiry form.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    #[garde(custom(validate_name))]
    pub first_name_and_last_name: String,
    #[garde(custom(validate_phone))]
    pub phone_number: String,
    #[garde(email)]
    pub email_address: String,
    #[garde(custom(validate_event_date))]
    pub event_date: String,
    #[garde(custom(validate_event_time))]
    pub event_time: String,
    #[garde(length(min = 1, max = 100))]
    pub event_type: String,
    #[garde(length(min = 1, max = 200))]
    pub event_name: String,
    #[serde(default)]
    #[garde(skip)]
    pub clients_hair_and_makeup: bool,
    #[serde(default)]
    #[garde(skip)]
    pub clients_hair_only: bool,
    #[serde(default)]
    #[garde(skip)]
    pub clients_makeup_only: bool,
    #[serde(default)]
    #[garde(length(max = 500))]
    pub event_location: Option<String>,
    #[serde(default)]
    #[garde(length(max = 2000))]
    pub additional_notes: Option<String>,
}

impl InquiryRequest {
    fn into_records(self) -> (NewClient, NewBooking) {
        let client = NewClient {
            name: self.first_name_and_last_name.trim().to_string(),
            email: self.email_address.trim().to_string(),
            phone: self.phone_number.trim().to_string(),
        };
        let booking = NewBooking {
            event_date: self.event_date,
            event_time: self.event_time,
            event_type: self.event_type,
            event_name: self.event_name,
            services: ServiceFlags {
                clients_hair_and_makeup: self.clients_hair_and_makeup,
                clients_hair_only: self.clients_hair_only,
                clients_makeup_only: self.clients_makeup_only,
            },
            location: self.event_location.filter(|l| !l.trim().is_empty()),
            notes: self.additional_notes.filter(|n| !n.trim().is_empty()),
        };
        (client, booking)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryResponse {
    pub success: bool,
    pub client_id: i64,
    pub booking_id: i64,
}

/// The staff decision on an inquiry.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryStatusRequest {
    pub client_id: i64,
    pub status: BookingStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryStatusResponse {
    pub success: bool,
    pub booking_id: i64,
    pub status: BookingStatus,
}

/// Accepts an inquiry from the public form.
#[axum::debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<InquiryRequest>,
) -> Result<Response> {
    payload.validate()?;
    let (client, booking) = payload.into_records();

    let (client, booking) = inquiry_service::submit_inquiry(&state, client, booking).await?;

    let response = InquiryResponse {
        success: true,
        client_id: client.id,
        booking_id: booking.id,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Approves or declines an inquiry.
#[axum::debug_handler]
pub async fn set_status(
    State(state): State<AppState>,
    Json(payload): Json<InquiryStatusRequest>,
) -> Result<Json<InquiryStatusResponse>> {
    let booking = inquiry_service::set_inquiry_status(&state, payload.client_id, payload.status).await?;

    Ok(Json(InquiryStatusResponse {
        success: true,
        booking_id: booking.id,
        status: booking.status,
    }))
}
