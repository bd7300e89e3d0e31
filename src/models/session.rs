use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a stored session row.
///
/// Validity is a predicate over `expires_at` evaluated at read time; nothing
/// in the row marks a session as expired.
#[derive(Debug, Clone)]
pub struct Session {
    /// The opaque token sent to the browser in the `sid` cookie.
    pub token: String,
    /// The ID of the account this session belongs to.
    pub account_id: i64,
    /// Serialized [`SessionPayload`]. Opaque to the store.
    pub payload: String,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

/// The structured blob carried by every session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
}

/// The identity resolved from a valid session and attached to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub account_id: i64,
}
