#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use booking_desk::{
    config::Config,
    error::{AppError, Result},
    repositories::{
        memory::MemoryStore,
        store::{RecordStore, SessionStore},
    },
    routes::build_router,
    services::{notifier::Notifier, session::Clock},
    state::AppState,
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// A clock that only moves when told to.
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(Utc::now())))
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Sms { to: String, body: String },
    Email { to: String, subject: String, body: String },
}

/// Records every message instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Sent>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn sms(&self) -> Vec<Sent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| matches!(m, Sent::Sms { .. }))
            .cloned()
            .collect()
    }

    pub fn emails(&self) -> Vec<Sent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| matches!(m, Sent::Email { .. }))
            .cloned()
            .collect()
    }

    /// SMS goes out on a spawned task, so give it a chance to run.
    pub async fn wait_for_sms(&self, count: usize) -> Vec<Sent> {
        for _ in 0..100 {
            let sms = self.sms();
            if sms.len() >= count {
                return sms;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sms()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_sms(&self, phone_number: &str, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Sms {
            to: phone_number.to_string(),
            body: body.to_string(),
        });
        if self.fail {
            return Err(AppError::Notifier("provider down".into()));
        }
        Ok(())
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Email {
            to: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        if self.fail {
            return Err(AppError::Notifier("provider down".into()));
        }
        Ok(())
    }
}

/// A session store whose writes always fail.
pub struct BrokenSessionStore;

#[async_trait]
impl SessionStore for BrokenSessionStore {
    async fn insert_session(&self, _: &booking_desk::models::session::Session) -> Result<()> {
        Err(AppError::Storage("sessions table unavailable".into()))
    }
    async fn find_session(&self, _: &str) -> Result<Option<booking_desk::models::session::Session>> {
        Ok(None)
    }
    async fn delete_session(&self, _: &str) -> Result<()> {
        Ok(())
    }
    async fn delete_expired_sessions(&self, _: DateTime<Utc>) -> Result<u64> {
        Ok(0)
    }
}

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw: Vec<u8>,
    pub json: Value,
}

impl Response {
    /// The `sid` value from a `Set-Cookie` header, if one was sent.
    pub fn session_cookie(&self) -> Option<String> {
        self.set_cookie_header()
            .and_then(|h| h.strip_prefix("sid=").map(|rest| rest.to_string()))
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
    }

    pub fn set_cookie_header(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("sid="))
            .map(|v| v.to_string())
    }
}

// Shared test context
pub struct TestContext {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.notifier.business_phone = Some("+15559990000".to_string());
    config
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::build(store.clone(), store, notifier)
    }

    pub fn with_session_store(session_store: Arc<dyn SessionStore>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::build(store, session_store, RecordingNotifier::default())
    }

    fn build(
        store: Arc<MemoryStore>,
        session_store: Arc<dyn SessionStore>,
        notifier: RecordingNotifier,
    ) -> Self {
        let clock = ManualClock::new();
        let notifier = Arc::new(notifier);
        let record_store: Arc<dyn RecordStore> = store.clone();
        let state = AppState::from_parts(
            test_config(),
            record_store,
            session_store,
            notifier.clone(),
            clock.clone(),
        );
        let router = build_router(state.clone()).expect("router builds");
        Self {
            router,
            state,
            store,
            clock,
            notifier,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        session: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = session {
            builder = builder.header(header::COOKIE, format!("sid={}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let raw = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        let json = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        Response {
            status,
            headers,
            raw,
            json,
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Response {
        self.send(
            Method::POST,
            "/register",
            Some(serde_json::json!({
                "email": email,
                "password": password,
                "firstName": "Sam",
                "lastName": "Lee"
            })),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.send(
            Method::POST,
            "/login",
            Some(serde_json::json!({ "email": email, "password": password })),
            None,
        )
        .await
    }

    /// Issues a session directly, as a signed-in staff member would hold.
    pub async fn staff_session(&self) -> String {
        self.state.sessions.create(1).await.unwrap()
    }
}

pub fn jane_doe_inquiry() -> Value {
    serde_json::json!({
        "firstNameAndLastName": "Jane Doe",
        "phoneNumber": "+15550001234",
        "emailAddress": "jane@example.com",
        "eventDate": "2025-06-01",
        "eventTime": "14:00",
        "eventType": "wedding",
        "eventName": "Doe Wedding",
        "clientsHairAndMakeup": true,
        "clientsHairOnly": false,
        "clientsMakeupOnly": false,
        "eventLocation": "Riverside Chapel",
        "additionalNotes": "Bridal party of four"
    })
}
