use async_trait::async_trait;
use serde::Serialize;

use crate::{
    config::NotifierConfig,
    error::{AppError, Result},
};

/// Outbound SMS and email.
///
/// Callers treat every failure as non-fatal: see [`dispatch_sms`] and
/// [`deliver_email`].
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_sms(&self, phone_number: &str, body: &str) -> Result<()>;
    async fn send_email(&self, address: &str, subject: &str, body: &str) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SmsBody<'a> {
    to: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text_content: &'a str,
}

fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Posts JSON messages to the configured SMS and email provider endpoints.
pub struct HttpNotifier {
    http: reqwest::Client,
    config: NotifierConfig,
}

impl HttpNotifier {
    pub fn new(config: NotifierConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("booking-desk/0.1")
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    async fn post<T: Serialize + Sync>(&self, url: &str, payload: &T) -> Result<()> {
        let mut request = self.http.post(url).json(payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Notifier(e.to_string()))?;

        let status = response.status().as_u16();
        if !is_success_status(status) {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Notifier(format!("provider returned {}: {}", status, text)));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_sms(&self, phone_number: &str, body: &str) -> Result<()> {
        let url = self
            .config
            .sms_api_url
            .as_deref()
            .ok_or_else(|| AppError::Notifier("SMS_API_URL is not configured".to_string()))?;
        self.post(url, &SmsBody { to: phone_number, body }).await
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> Result<()> {
        let url = self
            .config
            .email_api_url
            .as_deref()
            .ok_or_else(|| AppError::Notifier("EMAIL_API_URL is not configured".to_string()))?;
        let payload = EmailBody {
            from: &self.config.from_email,
            to: address,
            subject,
            text_content: body,
        };
        self.post(url, &payload).await
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_sms(&self, phone_number: &str, body: &str) -> Result<()> {
        tracing::info!("📱 [sms disabled] to={} body={:?}", phone_number, body);
        Ok(())
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> Result<()> {
        tracing::info!("📧 [email disabled] to={} subject={:?} body={:?}", address, subject, body);
        Ok(())
    }
}

/// Sends an SMS in the background. The caller never waits and never sees a
/// failure.
pub fn dispatch_sms(notifier: std::sync::Arc<dyn Notifier>, phone_number: String, body: String) {
    tokio::spawn(async move {
        match notifier.send_sms(&phone_number, &body).await {
            Ok(()) => tracing::info!("📱 SMS sent to {}", phone_number),
            Err(e) => tracing::error!("❌ SMS to {} failed: {}", phone_number, e),
        }
    });
}

/// Sends an email and waits for the provider, logging instead of returning
/// any failure.
pub async fn deliver_email(notifier: &dyn Notifier, address: &str, subject: &str, body: &str) {
    match notifier.send_email(address, subject, body).await {
        Ok(()) => tracing::info!("📧 Email sent to {}", address),
        Err(e) => tracing::error!("❌ Email to {} failed: {}", address, e),
    }
}
