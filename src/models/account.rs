use chrono::{DateTime, Utc};

/// A staff account able to sign in.
#[derive(Clone, Debug)]
pub struct Account {
    /// The unique identifier for the account.
    pub id: i64,
    /// The account's email address. Unique, matched exactly at login.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// The Argon2 PHC string. Never serialized into responses.
    pub password_hash: String,
    /// The timestamp when the account was created.
    pub created_at: DateTime<Utc>,
}

/// The fields needed to insert an account.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}
