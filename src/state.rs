use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::repositories::{
    memory::MemoryStore,
    postgres::PgStore,
    store::{RecordStore, SessionStore},
};
use crate::services::{
    notifier::{HttpNotifier, LogNotifier, Notifier},
    session::{Clock, SessionManager, SystemClock},
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// Accounts, clients, bookings and the feed.
    pub store: Arc<dyn RecordStore>,
    /// The only path to the sessions table.
    pub sessions: SessionManager,
    /// SMS and email dispatch.
    pub notifier: Arc<dyn Notifier>,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// Connects to PostgreSQL and applies the schema when `DATABASE_URL` is
    /// set; otherwise everything lives in memory for the life of the process.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let (store, session_store): (Arc<dyn RecordStore>, Arc<dyn SessionStore>) =
            match &config.database_url {
                Some(url) => {
                    let pool = crate::db::create_pool(url, config.store_timeout)?;
                    crate::db::run_migrations(&pool).await?;
                    tracing::info!("✅ PostgreSQL pool initialized with deadpool-postgres");
                    let pg = Arc::new(PgStore::new(pool, config.store_timeout));
                    let store: Arc<dyn RecordStore> = pg.clone();
                    let session_store: Arc<dyn SessionStore> = pg;
                    (store, session_store)
                }
                None => {
                    tracing::warn!("⚠️ DATABASE_URL not set, using the in-memory store (data is lost on exit)");
                    let memory = Arc::new(MemoryStore::new());
                    let store: Arc<dyn RecordStore> = memory.clone();
                    let session_store: Arc<dyn SessionStore> = memory;
                    (store, session_store)
                }
            };

        crate::crypto::password::prepare_dummy_hash();

        let notifier: Arc<dyn Notifier> = if config.notifier.is_configured() {
            tracing::info!("✅ Notifier initialized (HTTP providers)");
            Arc::new(HttpNotifier::new(config.notifier.clone())?)
        } else {
            tracing::warn!("⚠️ SMS_API_URL / EMAIL_API_URL not set, notifications are only logged");
            Arc::new(LogNotifier)
        };

        Ok(Self::from_parts(
            config.clone(),
            store,
            session_store,
            notifier,
            Arc::new(SystemClock),
        ))
    }

    /// Assembles a state from already-built collaborators.
    pub fn from_parts(
        config: Config,
        store: Arc<dyn RecordStore>,
        session_store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sessions = SessionManager::new(session_store, clock, config.session.ttl);
        Self {
            store,
            sessions,
            notifier,
            config,
        }
    }
}
