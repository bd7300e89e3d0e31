use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::validation::{auth::validate_name, inquiry::validate_phone};

/// A prospective or confirmed client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Partial update of a client. `None` leaves the column untouched.
///
/// Carries the same rules as the inquiry form, since status notifications go
/// to these contact details.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[garde(inner(custom(validate_name)))]
    pub name: Option<String>,
    #[garde(email)]
    pub email: Option<String>,
    #[garde(inner(custom(validate_phone)))]
    pub phone: Option<String>,
}
