use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, Result},
    models::{
        account::{Account, NewAccount},
        booking::{Booking, BookingPatch, BookingStatus, NewBooking},
        client::{Client, ClientPatch, NewClient},
        feed::{FeedItem, FeedPatch, NewFeedItem},
        session::Session,
    },
    repositories::store::{RecordStore, SessionStore},
};

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i64, Account>,
    clients: BTreeMap<i64, Client>,
    bookings: BTreeMap<i64, Booking>,
    feed: BTreeMap<i64, FeedItem>,
    sessions: HashMap<String, Session>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory store, useful for testing and for running without a database.
///
/// Every operation takes the single table lock, so multi-row writes such as
/// [`RecordStore::create_inquiry`] are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of session rows currently held, expired or not.
    pub async fn session_count(&self) -> usize {
        self.tables.lock().await.sessions.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_account(&self, account: NewAccount) -> Result<Account> {
        let mut tables = self.tables.lock().await;
        if tables.accounts.values().any(|a| a.email == account.email) {
            return Err(AppError::DuplicateEmail);
        }
        let id = tables.next_id();
        let account = Account {
            id,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            password_hash: account.password_hash,
            created_at: Utc::now(),
        };
        tables.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let tables = self.tables.lock().await;
        Ok(tables.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        Ok(self.tables.lock().await.accounts.get(&id).cloned())
    }

    async fn create_inquiry(&self, client: NewClient, booking: NewBooking) -> Result<(Client, Booking)> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();

        let client_id = tables.next_id();
        let client = Client {
            id: client_id,
            name: client.name,
            email: client.email,
            phone: client.phone,
            created_at: now,
        };

        let booking_id = tables.next_id();
        let booking = Booking {
            id: booking_id,
            client_id,
            event_date: booking.event_date,
            event_time: booking.event_time,
            event_type: booking.event_type,
            event_name: booking.event_name,
            services: booking.services,
            location: booking.location,
            notes: booking.notes,
            status: BookingStatus::Pending,
            created_at: now,
        };

        tables.clients.insert(client_id, client.clone());
        tables.bookings.insert(booking_id, booking.clone());
        Ok((client, booking))
    }

    async fn list_clients(&self) -> Result<Vec<Client>> {
        Ok(self.tables.lock().await.clients.values().cloned().collect())
    }

    async fn find_client(&self, id: i64) -> Result<Option<Client>> {
        Ok(self.tables.lock().await.clients.get(&id).cloned())
    }

    async fn update_client(&self, id: i64, patch: ClientPatch) -> Result<Option<Client>> {
        let mut tables = self.tables.lock().await;
        let Some(client) = tables.clients.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            client.name = name;
        }
        if let Some(email) = patch.email {
            client.email = email;
        }
        if let Some(phone) = patch.phone {
            client.phone = phone;
        }
        Ok(Some(client.clone()))
    }

    async fn delete_client(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.clients.remove(&id).is_none() {
            return Ok(false);
        }
        tables.bookings.retain(|_, b| b.client_id != id);
        Ok(true)
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>> {
        Ok(self.tables.lock().await.bookings.values().cloned().collect())
    }

    async fn find_booking(&self, id: i64) -> Result<Option<Booking>> {
        Ok(self.tables.lock().await.bookings.get(&id).cloned())
    }

    async fn find_booking_by_client(&self, client_id: i64) -> Result<Option<Booking>> {
        let tables = self.tables.lock().await;
        Ok(tables.bookings.values().find(|b| b.client_id == client_id).cloned())
    }

    async fn update_booking(&self, id: i64, patch: BookingPatch) -> Result<Option<Booking>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.bookings.get_mut(&id).map(|booking| {
            patch.apply(booking);
            booking.clone()
        }))
    }

    async fn delete_booking(&self, id: i64) -> Result<bool> {
        Ok(self.tables.lock().await.bookings.remove(&id).is_some())
    }

    async fn list_feed(&self) -> Result<Vec<FeedItem>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<FeedItem> = tables.feed.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn create_feed_item(&self, item: NewFeedItem) -> Result<FeedItem> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let item = FeedItem {
            id,
            content: item.content,
            image_url: item.image_url,
            created_at: Utc::now(),
        };
        tables.feed.insert(id, item.clone());
        Ok(item)
    }

    async fn update_feed_item(&self, id: i64, patch: FeedPatch) -> Result<Option<FeedItem>> {
        let mut tables = self.tables.lock().await;
        let Some(item) = tables.feed.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(content) = patch.content {
            item.content = content;
        }
        if let Some(image_url) = patch.image_url {
            item.image_url = image_url;
        }
        Ok(Some(item.clone()))
    }

    async fn delete_feed_item(&self, id: i64) -> Result<bool> {
        Ok(self.tables.lock().await.feed.remove(&id).is_some())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, session: &Session) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if tables.sessions.contains_key(&session.token) {
            return Err(AppError::Storage("duplicate session token".to_string()));
        }
        tables.sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        Ok(self.tables.lock().await.sessions.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        self.tables.lock().await.sessions.remove(token);
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - tables.sessions.len()) as u64)
    }
}
