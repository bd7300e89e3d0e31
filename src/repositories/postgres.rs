use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::{error::SqlState, types::FromSql, Row};

use crate::{
    error::{AppError, Result},
    models::{
        account::{Account, NewAccount},
        booking::{Booking, BookingPatch, NewBooking, ServiceFlags},
        client::{Client, ClientPatch, NewClient},
        feed::{FeedItem, FeedPatch, NewFeedItem},
        session::Session,
    },
    repositories::store::{RecordStore, SessionStore},
};

const BOOKING_COLUMNS: &str = "id, client_id, event_date, event_time, event_type, event_name, \
     clients_hair_and_makeup, clients_hair_only, clients_makeup_only, location, notes, status, created_at";

/// Reads a column, reporting the column name if it is missing or mistyped.
fn col<'a, T: FromSql<'a>>(row: &'a Row, name: &str) -> Result<T> {
    row.try_get(name)
        .map_err(|e| AppError::Storage(format!("column {}: {}", name, e)))
}

fn row_to_account(row: &Row) -> Result<Account> {
    Ok(Account {
        id: col(row, "id")?,
        email: col(row, "email")?,
        first_name: col(row, "first_name")?,
        last_name: col(row, "last_name")?,
        password_hash: col(row, "password_hash")?,
        created_at: col(row, "created_at")?,
    })
}

fn row_to_client(row: &Row) -> Result<Client> {
    Ok(Client {
        id: col(row, "id")?,
        name: col(row, "name")?,
        email: col(row, "email")?,
        phone: col(row, "phone")?,
        created_at: col(row, "created_at")?,
    })
}

fn row_to_booking(row: &Row) -> Result<Booking> {
    let status: String = col(row, "status")?;
    Ok(Booking {
        id: col(row, "id")?,
        client_id: col(row, "client_id")?,
        event_date: col(row, "event_date")?,
        event_time: col(row, "event_time")?,
        event_type: col(row, "event_type")?,
        event_name: col(row, "event_name")?,
        services: ServiceFlags {
            clients_hair_and_makeup: col(row, "clients_hair_and_makeup")?,
            clients_hair_only: col(row, "clients_hair_only")?,
            clients_makeup_only: col(row, "clients_makeup_only")?,
        },
        location: col(row, "location")?,
        notes: col(row, "notes")?,
        status: status
            .parse()
            .map_err(|_| AppError::Storage(format!("unknown booking status {}", status)))?,
        created_at: col(row, "created_at")?,
    })
}

fn row_to_feed_item(row: &Row) -> Result<FeedItem> {
    Ok(FeedItem {
        id: col(row, "id")?,
        content: col(row, "content")?,
        image_url: col(row, "image_url")?,
        created_at: col(row, "created_at")?,
    })
}

fn row_to_session(row: &Row) -> Result<Session> {
    Ok(Session {
        token: col(row, "token")?,
        account_id: col(row, "account_id")?,
        payload: col(row, "payload")?,
        created_at: col(row, "created_at")?,
        expires_at: col(row, "expires_at")?,
    })
}

/// PostgreSQL-backed store over a shared `deadpool-postgres` pool.
///
/// Every operation, including the wait for a pooled connection, is bounded
/// by `op_timeout`.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
    op_timeout: Duration,
}

impl PgStore {
    pub fn new(pool: Pool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    async fn timed<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        tokio::time::timeout(self.op_timeout, fut).await?
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert_account(&self, account: NewAccount) -> Result<Account> {
        self.timed(async {
            let client = self.pool.get().await?;
            let row = client
                .query_one(
                    r#"
                    INSERT INTO accounts (email, first_name, last_name, password_hash)
                    VALUES ($1, $2, $3, $4)
                    RETURNING *
                    "#,
                    &[&account.email, &account.first_name, &account.last_name, &account.password_hash],
                )
                .await
                .map_err(|e| {
                    if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                        AppError::DuplicateEmail
                    } else {
                        AppError::from(e)
                    }
                })?;
            row_to_account(&row)
        })
        .await
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let row = client
                .query_opt("SELECT * FROM accounts WHERE email = $1", &[&email])
                .await?;
            row.map(|r| row_to_account(&r)).transpose()
        })
        .await
    }

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let row = client
                .query_opt("SELECT * FROM accounts WHERE id = $1", &[&id])
                .await?;
            row.map(|r| row_to_account(&r)).transpose()
        })
        .await
    }

    async fn create_inquiry(&self, new_client: NewClient, new_booking: NewBooking) -> Result<(Client, Booking)> {
        self.timed(async {
            let mut conn = self.pool.get().await?;
            let tx = conn.transaction().await?;

            let client_row = tx
                .query_one(
                    r#"
                    INSERT INTO clients (name, email, phone)
                    VALUES ($1, $2, $3)
                    RETURNING *
                    "#,
                    &[&new_client.name, &new_client.email, &new_client.phone],
                )
                .await?;
            let client = row_to_client(&client_row)?;

            let sql = format!(
                r#"
                INSERT INTO bookings (client_id, event_date, event_time, event_type, event_name,
                    clients_hair_and_makeup, clients_hair_only, clients_makeup_only, location, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING {}
                "#,
                BOOKING_COLUMNS
            );
            let booking_row = tx
                .query_one(
                    &sql,
                    &[
                        &client.id,
                        &new_booking.event_date,
                        &new_booking.event_time,
                        &new_booking.event_type,
                        &new_booking.event_name,
                        &new_booking.services.clients_hair_and_makeup,
                        &new_booking.services.clients_hair_only,
                        &new_booking.services.clients_makeup_only,
                        &new_booking.location,
                        &new_booking.notes,
                    ],
                )
                .await?;
            let booking = row_to_booking(&booking_row)?;

            // Dropping `tx` without commit rolls back the client insert.
            tx.commit().await?;
            Ok((client, booking))
        })
        .await
    }

    async fn list_clients(&self) -> Result<Vec<Client>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let rows = client
                .query("SELECT * FROM clients ORDER BY id", &[])
                .await?;
            rows.iter().map(row_to_client).collect()
        })
        .await
    }

    async fn find_client(&self, id: i64) -> Result<Option<Client>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let row = client
                .query_opt("SELECT * FROM clients WHERE id = $1", &[&id])
                .await?;
            row.map(|r| row_to_client(&r)).transpose()
        })
        .await
    }

    async fn update_client(&self, id: i64, patch: ClientPatch) -> Result<Option<Client>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let row = client
                .query_opt(
                    r#"
                    UPDATE clients
                    SET
                        name = COALESCE($2, name),
                        email = COALESCE($3, email),
                        phone = COALESCE($4, phone)
                    WHERE id = $1
                    RETURNING *
                    "#,
                    &[&id, &patch.name, &patch.email, &patch.phone],
                )
                .await?;
            row.map(|r| row_to_client(&r)).transpose()
        })
        .await
    }

    async fn delete_client(&self, id: i64) -> Result<bool> {
        self.timed(async {
            let client = self.pool.get().await?;
            let deleted = client
                .execute("DELETE FROM clients WHERE id = $1", &[&id])
                .await?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let sql = format!("SELECT {} FROM bookings ORDER BY id", BOOKING_COLUMNS);
            let rows = client.query(&sql, &[]).await?;
            rows.iter().map(row_to_booking).collect()
        })
        .await
    }

    async fn find_booking(&self, id: i64) -> Result<Option<Booking>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
            let row = client.query_opt(&sql, &[&id]).await?;
            row.map(|r| row_to_booking(&r)).transpose()
        })
        .await
    }

    async fn find_booking_by_client(&self, client_id: i64) -> Result<Option<Booking>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let sql = format!("SELECT {} FROM bookings WHERE client_id = $1", BOOKING_COLUMNS);
            let row = client.query_opt(&sql, &[&client_id]).await?;
            row.map(|r| row_to_booking(&r)).transpose()
        })
        .await
    }

    async fn update_booking(&self, id: i64, patch: BookingPatch) -> Result<Option<Booking>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let status = patch.status.map(|s| s.as_str());
            let set_location = patch.location.is_some();
            let location = patch.location.clone().flatten();
            let set_notes = patch.notes.is_some();
            let notes = patch.notes.clone().flatten();
            let sql = format!(
                r#"
                UPDATE bookings
                SET
                    event_date = COALESCE($2, event_date),
                    event_time = COALESCE($3, event_time),
                    event_type = COALESCE($4, event_type),
                    event_name = COALESCE($5, event_name),
                    clients_hair_and_makeup = COALESCE($6, clients_hair_and_makeup),
                    clients_hair_only = COALESCE($7, clients_hair_only),
                    clients_makeup_only = COALESCE($8, clients_makeup_only),
                    location = CASE WHEN $9::BOOLEAN THEN $10::TEXT ELSE location END,
                    notes = CASE WHEN $11::BOOLEAN THEN $12::TEXT ELSE notes END,
                    status = COALESCE($13, status)
                WHERE id = $1
                RETURNING {}
                "#,
                BOOKING_COLUMNS
            );
            let row = client
                .query_opt(
                    &sql,
                    &[
                        &id,
                        &patch.event_date,
                        &patch.event_time,
                        &patch.event_type,
                        &patch.event_name,
                        &patch.clients_hair_and_makeup,
                        &patch.clients_hair_only,
                        &patch.clients_makeup_only,
                        &set_location,
                        &location,
                        &set_notes,
                        &notes,
                        &status,
                    ],
                )
                .await?;
            row.map(|r| row_to_booking(&r)).transpose()
        })
        .await
    }

    async fn delete_booking(&self, id: i64) -> Result<bool> {
        self.timed(async {
            let client = self.pool.get().await?;
            let deleted = client
                .execute("DELETE FROM bookings WHERE id = $1", &[&id])
                .await?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn list_feed(&self) -> Result<Vec<FeedItem>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let rows = client
                .query("SELECT * FROM feed_items ORDER BY created_at DESC, id DESC", &[])
                .await?;
            rows.iter().map(row_to_feed_item).collect()
        })
        .await
    }

    async fn create_feed_item(&self, item: NewFeedItem) -> Result<FeedItem> {
        self.timed(async {
            let client = self.pool.get().await?;
            let row = client
                .query_one(
                    "INSERT INTO feed_items (content, image_url) VALUES ($1, $2) RETURNING *",
                    &[&item.content, &item.image_url],
                )
                .await?;
            row_to_feed_item(&row)
        })
        .await
    }

    async fn update_feed_item(&self, id: i64, patch: FeedPatch) -> Result<Option<FeedItem>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let set_image = patch.image_url.is_some();
            let image_url = patch.image_url.clone().flatten();
            let row = client
                .query_opt(
                    r#"
                    UPDATE feed_items
                    SET
                        content = COALESCE($2, content),
                        image_url = CASE WHEN $3::BOOLEAN THEN $4::TEXT ELSE image_url END
                    WHERE id = $1
                    RETURNING *
                    "#,
                    &[&id, &patch.content, &set_image, &image_url],
                )
                .await?;
            row.map(|r| row_to_feed_item(&r)).transpose()
        })
        .await
    }

    async fn delete_feed_item(&self, id: i64) -> Result<bool> {
        self.timed(async {
            let client = self.pool.get().await?;
            let deleted = client
                .execute("DELETE FROM feed_items WHERE id = $1", &[&id])
                .await?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert_session(&self, session: &Session) -> Result<()> {
        self.timed(async {
            let client = self.pool.get().await?;
            client
                .execute(
                    r#"
                    INSERT INTO sessions (token, account_id, payload, created_at, expires_at)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                    &[
                        &session.token,
                        &session.account_id,
                        &session.payload,
                        &session.created_at,
                        &session.expires_at,
                    ],
                )
                .await?;
            Ok(())
        })
        .await
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        self.timed(async {
            let client = self.pool.get().await?;
            let row = client
                .query_opt("SELECT * FROM sessions WHERE token = $1", &[&token])
                .await?;
            row.map(|r| row_to_session(&r)).transpose()
        })
        .await
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        self.timed(async {
            let client = self.pool.get().await?;
            client
                .execute("DELETE FROM sessions WHERE token = $1", &[&token])
                .await?;
            Ok(())
        })
        .await
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        self.timed(async {
            let client = self.pool.get().await?;
            let deleted = client
                .execute("DELETE FROM sessions WHERE expires_at <= $1", &[&now])
                .await?;
            Ok(deleted)
        })
        .await
    }
}
