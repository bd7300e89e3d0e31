use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::patch::nullable;
use crate::validation::inquiry::{validate_event_date, validate_event_time};

/// Lifecycle of an inquiry as decided by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Declined,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "declined" => Ok(BookingStatus::Declined),
            other => Err(AppError::Validation(format!("Unknown booking status: {}", other))),
        }
    }
}

/// Which services the client asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFlags {
    #[serde(default)]
    pub clients_hair_and_makeup: bool,
    #[serde(default)]
    pub clients_hair_only: bool,
    #[serde(default)]
    pub clients_makeup_only: bool,
}

/// An event booking attached to exactly one client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub client_id: i64,
    /// `YYYY-MM-DD`.
    pub event_date: String,
    /// `HH:MM`, 24-hour clock.
    pub event_time: String,
    pub event_type: String,
    pub event_name: String,
    #[serde(flatten)]
    pub services: ServiceFlags,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Booking fields supplied with an inquiry. The client id is assigned by the
/// store inside the same transaction that creates the client.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub event_date: String,
    pub event_time: String,
    pub event_type: String,
    pub event_name: String,
    pub services: ServiceFlags,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Partial update of a booking. `None` leaves the column untouched; for
/// `location` and `notes`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    #[garde(inner(custom(validate_event_date)))]
    pub event_date: Option<String>,
    #[garde(inner(custom(validate_event_time)))]
    pub event_time: Option<String>,
    #[garde(length(min = 1, max = 100))]
    pub event_type: Option<String>,
    #[garde(length(min = 1, max = 200))]
    pub event_name: Option<String>,
    #[garde(skip)]
    pub clients_hair_and_makeup: Option<bool>,
    #[garde(skip)]
    pub clients_hair_only: Option<bool>,
    #[garde(skip)]
    pub clients_makeup_only: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[garde(length(max = 500))]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[garde(length(max = 2000))]
    pub notes: Option<Option<String>>,
    #[garde(skip)]
    pub status: Option<BookingStatus>,
}

impl BookingPatch {
    /// A patch that changes the status and nothing else.
    pub fn status_only(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Applies the patch to an in-memory booking.
    pub fn apply(&self, booking: &mut Booking) {
        if let Some(v) = &self.event_date {
            booking.event_date = v.clone();
        }
        if let Some(v) = &self.event_time {
            booking.event_time = v.clone();
        }
        if let Some(v) = &self.event_type {
            booking.event_type = v.clone();
        }
        if let Some(v) = &self.event_name {
            booking.event_name = v.clone();
        }
        if let Some(v) = self.clients_hair_and_makeup {
            booking.services.clients_hair_and_makeup = v;
        }
        if let Some(v) = self.clients_hair_only {
            booking.services.clients_hair_only = v;
        }
        if let Some(v) = self.clients_makeup_only {
            booking.services.clients_makeup_only = v;
        }
        if let Some(v) = &self.location {
            booking.location = v.clone();
        }
        if let Some(v) = &self.notes {
            booking.notes = v.clone();
        }
        if let Some(v) = self.status {
            booking.status = v;
        }
    }
}
