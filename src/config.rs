use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_cookies::cookie::SameSite;
use zeroize::Zeroizing;

/// Default session lifetime: 24 hours.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 24 * 60;
/// Longest accepted session lifetime: 30 days.
pub const MAX_SESSION_TTL_MINUTES: i64 = 30 * 24 * 60;
/// Default interval between expired-session sweeps: 30 minutes.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30 * 60;

/// Session lifetime and cleanup policy.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Absolute lifetime of a session from issuance.
    pub ttl: chrono::Duration,
    /// How often the background sweep removes expired sessions.
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Cross-site attributes of the session cookie, set per deployment.
#[derive(Clone, Debug)]
pub struct CookieConfig {
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

/// Endpoints and credentials of the SMS and email providers.
#[derive(Clone, Default)]
pub struct NotifierConfig {
    pub sms_api_url: Option<String>,
    pub email_api_url: Option<String>,
    pub api_key: Option<Zeroizing<String>>,
    /// Sender address for outgoing email.
    pub from_email: String,
    /// Business phone number that receives new-inquiry alerts.
    pub business_phone: Option<String>,
    pub timeout: Duration,
}

impl NotifierConfig {
    /// Whether both provider endpoints are configured.
    pub fn is_configured(&self) -> bool {
        self.sms_api_url.is_some() && self.email_api_url.is_some()
    }
}

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    pub session: SessionConfig,
    pub cookie: CookieConfig,
    /// Upper bound on any single record store operation.
    pub store_timeout: Duration,
    /// Origins allowed by the CORS layer.
    pub cors_allowed_origins: Vec<String>,
    /// Whether `/login` and `/register` are rate limited per client IP.
    pub auth_rate_limit: bool,
    pub notifier: NotifierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            session: SessionConfig::default(),
            cookie: CookieConfig::default(),
            store_timeout: Duration::from_secs(5),
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            auth_rate_limit: false,
            notifier: NotifierConfig {
                from_email: "bookings@localhost".to_string(),
                timeout: Duration::from_secs(5),
                ..NotifierConfig::default()
            },
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", name)),
        Err(_) => Ok(default),
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turns a configured lifetime in minutes into a session TTL.
pub fn session_ttl(minutes: i64) -> Result<chrono::Duration> {
    if !(1..=MAX_SESSION_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!(
            "SESSION_TTL_MINUTES must be between 1 and {} (got {})",
            MAX_SESSION_TTL_MINUTES,
            minutes
        );
    }
    chrono::Duration::try_minutes(minutes).context("SESSION_TTL_MINUTES out of range")
}

/// Parses a `SameSite` policy name.
pub fn parse_same_site(value: &str) -> Result<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => Ok(SameSite::None),
        other => anyhow::bail!("COOKIE_SAME_SITE must be lax, strict or none (got {})", other),
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let ttl = session_ttl(parse_var("SESSION_TTL_MINUTES", DEFAULT_SESSION_TTL_MINUTES)?)?;
        let sweep_secs: u64 = parse_var("SESSION_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?;
        if sweep_secs == 0 {
            anyhow::bail!("SESSION_SWEEP_INTERVAL_SECS must be positive");
        }

        let same_site = match optional_var("COOKIE_SAME_SITE") {
            Some(raw) => parse_same_site(&raw)?,
            None => defaults.cookie.same_site,
        };

        let cors_allowed_origins = match optional_var("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => defaults.cors_allowed_origins,
        };

        Ok(Self {
            database_url: optional_var("DATABASE_URL"),
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr)?,
            session: SessionConfig {
                ttl,
                sweep_interval: Duration::from_secs(sweep_secs),
            },
            cookie: CookieConfig {
                secure: parse_var("COOKIE_SECURE", false)?,
                same_site,
            },
            store_timeout: Duration::from_millis(parse_var("STORE_TIMEOUT_MS", 5000u64)?),
            cors_allowed_origins,
            auth_rate_limit: parse_var("AUTH_RATE_LIMIT", true)?,
            notifier: NotifierConfig {
                sms_api_url: optional_var("SMS_API_URL"),
                email_api_url: optional_var("EMAIL_API_URL"),
                api_key: optional_var("NOTIFIER_API_KEY").map(Zeroizing::new),
                from_email: optional_var("NOTIFY_FROM_EMAIL")
                    .unwrap_or(defaults.notifier.from_email),
                business_phone: optional_var("NOTIFY_SMS_TO"),
                timeout: Duration::from_millis(parse_var("NOTIFIER_TIMEOUT_MS", 5000u64)?),
            },
        })
    }
}
