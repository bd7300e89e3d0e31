use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{
    crypto::token::{generate_session_token, token_prefix},
    error::{AppError, Result},
    models::session::{Identity, Session, SessionPayload},
    repositories::store::SessionStore,
};

/// Source of the current time. Swappable so expiry can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Owns the session table: issuance, validation, revocation and sweeping.
///
/// Nothing else in the crate writes sessions. A session is valid while its
/// row exists and `expires_at` is still in the future; the check happens on
/// every validation, whether or not the sweep has run.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, ttl: chrono::Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// The fixed lifetime of every session issued by this manager.
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Issues a session for `account_id` and returns its token.
    ///
    /// # Errors
    ///
    /// `AppError::Storage` if the row could not be persisted, or
    /// `AppError::Internal` if the expiry does not fit in a timestamp. The
    /// caller must not hand out a cookie in either case.
    pub async fn create(&self, account_id: i64) -> Result<String> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("Session expiry out of range".to_string()))?;
        let token = generate_session_token();

        let payload = SessionPayload {
            account_id,
            created_at: now,
        };
        let payload = sonic_rs::to_string(&payload)
            .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;

        let session = Session {
            token: token.clone(),
            account_id,
            payload,
            created_at: now,
            expires_at,
        };

        self.store.insert_session(&session).await.map_err(|e| {
            tracing::error!("❌ Failed to persist session for account {}: {}", account_id, e);
            e
        })?;

        tracing::info!(
            "✅ Session {}… issued for account {} (expires {})",
            token_prefix(&token),
            account_id,
            session.expires_at
        );
        Ok(token)
    }

    /// Resolves a token to the identity it was issued for.
    ///
    /// Returns `Ok(None)` for unknown, expired or unreadable sessions. Never
    /// writes to the store.
    pub async fn validate(&self, token: &str) -> Result<Option<Identity>> {
        let Some(session) = self.store.find_session(token).await? else {
            tracing::debug!("🔍 Unknown session {}…", token_prefix(token));
            return Ok(None);
        };

        if session.expires_at <= self.clock.now() {
            tracing::debug!(
                "⏰ Session {}… expired at {}",
                token_prefix(token),
                session.expires_at
            );
            return Ok(None);
        }

        match sonic_rs::from_str::<SessionPayload>(&session.payload) {
            Ok(payload) => Ok(Some(Identity {
                account_id: payload.account_id,
            })),
            Err(e) => {
                tracing::warn!("❌ Invalid payload in session {}…: {}", token_prefix(token), e);
                Ok(None)
            }
        }
    }

    /// Deletes the session. Revoking an unknown token is a no-op.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        self.store.delete_session(token).await?;
        tracing::info!("👋 Session {}… revoked", token_prefix(token));
        Ok(())
    }

    /// Deletes every session whose expiry has passed and returns the count.
    pub async fn sweep(&self) -> Result<u64> {
        let removed = self.store.delete_expired_sessions(self.clock.now()).await?;
        tracing::info!("🧹 Session sweep removed {} expired session(s)", removed);
        Ok(removed)
    }

    /// Spawns the periodic sweep for the lifetime of the process.
    ///
    /// A failed sweep is logged and the next tick runs as usual. The first
    /// sweep happens immediately.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = manager.sweep().await {
                    tracing::error!("❌ Session sweep failed: {}", e);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Utc::now())))
        }

        fn advance(&self, by: chrono::Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn manager(ttl_minutes: i64) -> (SessionManager, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::new();
        let manager = SessionManager::new(
            store.clone(),
            clock.clone(),
            chrono::Duration::minutes(ttl_minutes),
        );
        (manager, store, clock)
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let (manager, _, _) = manager(30);
        assert_eq!(manager.validate("never-issued").await.unwrap(), None);
        assert_eq!(manager.validate("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn oversized_ttl_is_an_error_not_a_panic() {
        let store = Arc::new(MemoryStore::new());
        let manager = SessionManager::new(
            store.clone(),
            Arc::new(SystemClock),
            chrono::Duration::minutes(200_000_000_000),
        );

        let err = manager.create(1).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn created_session_resolves_to_its_account() {
        let (manager, _, _) = manager(30);
        let token = manager.create(42).await.unwrap();
        assert_eq!(
            manager.validate(&token).await.unwrap(),
            Some(Identity { account_id: 42 })
        );
        // Validation is read-only and repeatable.
        assert_eq!(
            manager.validate(&token).await.unwrap(),
            Some(Identity { account_id: 42 })
        );
    }

    #[tokio::test]
    async fn stored_row_carries_payload_and_expiry() {
        let (manager, store, clock) = manager(30);
        let token = manager.create(7).await.unwrap();

        let row = store.find_session(&token).await.unwrap().unwrap();
        assert_eq!(row.account_id, 7);
        assert_eq!(row.expires_at - row.created_at, chrono::Duration::minutes(30));
        assert_eq!(row.created_at, clock.now());

        let payload: SessionPayload = sonic_rs::from_str(&row.payload).unwrap();
        assert_eq!(payload.account_id, 7);
        assert_eq!(payload.created_at, row.created_at);
    }

    #[tokio::test]
    async fn expired_session_fails_before_any_sweep() {
        let (manager, store, clock) = manager(30);
        let token = manager.create(1).await.unwrap();

        clock.advance(chrono::Duration::minutes(29));
        assert!(manager.validate(&token).await.unwrap().is_some());

        clock.advance(chrono::Duration::minutes(1));
        assert_eq!(manager.validate(&token).await.unwrap(), None);
        // The row is still there; expiry is a predicate, not a deletion.
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn sweep_removes_exactly_the_expired_rows() {
        let (manager, store, clock) = manager(30);
        let old_a = manager.create(1).await.unwrap();
        let old_b = manager.create(2).await.unwrap();

        clock.advance(chrono::Duration::minutes(20));
        let fresh = manager.create(3).await.unwrap();

        clock.advance(chrono::Duration::minutes(10));
        assert_eq!(manager.sweep().await.unwrap(), 2);
        assert_eq!(store.session_count().await, 1);
        assert!(store.find_session(&old_a).await.unwrap().is_none());
        assert!(store.find_session(&old_b).await.unwrap().is_none());
        assert_eq!(
            manager.validate(&fresh).await.unwrap(),
            Some(Identity { account_id: 3 })
        );

        assert_eq!(manager.sweep().await.unwrap(), 0);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let (manager, _, _) = manager(30);
        let token = manager.create(5).await.unwrap();

        manager.revoke(&token).await.unwrap();
        assert_eq!(manager.validate(&token).await.unwrap(), None);
        manager.revoke(&token).await.unwrap();
        manager.revoke("never-issued").await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_payload_is_invalid() {
        let (manager, store, clock) = manager(30);
        let now = clock.now();
        store
            .insert_session(&Session {
                token: "tampered".into(),
                account_id: 9,
                payload: "{not json".into(),
                created_at: now,
                expires_at: now + chrono::Duration::minutes(5),
            })
            .await
            .unwrap();

        assert_eq!(manager.validate("tampered").await.unwrap(), None);
    }

    struct FlakyStore {
        sweeps: AtomicUsize,
    }

    #[async_trait]
    impl SessionStore for FlakyStore {
        async fn insert_session(&self, _: &Session) -> Result<()> {
            Err(AppError::Storage("down".into()))
        }
        async fn find_session(&self, _: &str) -> Result<Option<Session>> {
            Err(AppError::Storage("down".into()))
        }
        async fn delete_session(&self, _: &str) -> Result<()> {
            Ok(())
        }
        async fn delete_expired_sessions(&self, _: DateTime<Utc>) -> Result<u64> {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Storage("down".into()))
        }
    }

    #[tokio::test]
    async fn create_surfaces_storage_failure() {
        let manager = SessionManager::new(
            Arc::new(FlakyStore { sweeps: AtomicUsize::new(0) }),
            Arc::new(SystemClock),
            chrono::Duration::minutes(30),
        );
        assert!(matches!(manager.create(1).await, Err(AppError::Storage(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_keeps_running_after_failures() {
        let store = Arc::new(FlakyStore { sweeps: AtomicUsize::new(0) });
        let manager = SessionManager::new(
            store.clone(),
            Arc::new(SystemClock),
            chrono::Duration::minutes(30),
        );

        let handle = manager.spawn_sweeper(Duration::from_secs(60));
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        tokio::task::yield_now().await;

        assert!(store.sweeps.load(Ordering::SeqCst) >= 3);
        assert!(!handle.is_finished());
        handle.abort();
    }
}
