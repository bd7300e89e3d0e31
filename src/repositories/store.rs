use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::Result,
    models::{
        account::{Account, NewAccount},
        booking::{Booking, BookingPatch, NewBooking},
        client::{Client, ClientPatch, NewClient},
        feed::{FeedItem, FeedPatch, NewFeedItem},
        session::Session,
    },
};

/// Storage for accounts, clients, bookings and the feed.
///
/// Sessions are deliberately absent: only the session manager holds a
/// [`SessionStore`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts an account. Fails with `DuplicateEmail` if the email is taken.
    async fn insert_account(&self, account: NewAccount) -> Result<Account>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>>;

    /// Inserts a client and its booking as one unit: either both rows exist
    /// afterwards or neither does.
    async fn create_inquiry(&self, client: NewClient, booking: NewBooking) -> Result<(Client, Booking)>;

    async fn list_clients(&self) -> Result<Vec<Client>>;
    async fn find_client(&self, id: i64) -> Result<Option<Client>>;
    async fn update_client(&self, id: i64, patch: ClientPatch) -> Result<Option<Client>>;
    /// Deletes a client and its booking. Returns whether the client existed.
    async fn delete_client(&self, id: i64) -> Result<bool>;

    async fn list_bookings(&self) -> Result<Vec<Booking>>;
    async fn find_booking(&self, id: i64) -> Result<Option<Booking>>;
    async fn find_booking_by_client(&self, client_id: i64) -> Result<Option<Booking>>;
    async fn update_booking(&self, id: i64, patch: BookingPatch) -> Result<Option<Booking>>;
    async fn delete_booking(&self, id: i64) -> Result<bool>;

    /// Lists feed items, newest first.
    async fn list_feed(&self) -> Result<Vec<FeedItem>>;
    async fn create_feed_item(&self, item: NewFeedItem) -> Result<FeedItem>;
    async fn update_feed_item(&self, id: i64, patch: FeedPatch) -> Result<Option<FeedItem>>;
    async fn delete_feed_item(&self, id: i64) -> Result<bool>;
}

/// Storage for session rows. The store applies no expiry of its own.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: &Session) -> Result<()>;
    async fn find_session(&self, token: &str) -> Result<Option<Session>>;
    /// Deletes the row if present. Deleting a missing token is not an error.
    async fn delete_session(&self, token: &str) -> Result<()>;
    /// Deletes every row with `expires_at <= now` and returns how many went.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64>;
}
