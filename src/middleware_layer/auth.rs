use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    crypto::token::token_prefix,
    error::AppError,
    state::AppState,
};

/// The name of the session cookie.
pub const SESSION_COOKIE: &str = "sid";

/// Extracts the session token from the request cookies.
///
/// An empty cookie value counts as absent.
pub fn extract_session_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// A middleware that requires a valid session to be present.
///
/// On success the resolved [`Identity`](crate::models::session::Identity) is
/// inserted into the request extensions. The session's expiry is never
/// extended here.
///
/// # Returns
///
/// The downstream `Response`, or `AppError::Unauthorized` if the cookie is
/// missing or the session is unknown or expired.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let token = extract_session_token(&cookies).ok_or_else(|| {
        tracing::debug!("❌ No {} cookie found", SESSION_COOKIE);
        AppError::Unauthorized
    })?;

    let identity = state.sessions.validate(&token).await?.ok_or_else(|| {
        tracing::warn!("❌ Rejected session {}…", token_prefix(&token));
        AppError::Unauthorized
    })?;

    tracing::debug!("✅ Account authenticated: {}", identity.account_id);

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
