use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

use crate::{
    config::CookieConfig,
    error::Result,
    middleware_layer::auth::{extract_session_token, SESSION_COOKIE},
    models::session::Identity,
    services::auth as auth_service,
    state::AppState,
    validation::auth::{validate_name, validate_password},
};

/// The request payload for account registration.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[garde(email)]
    pub email: String,
    #[garde(custom(validate_password))]
    pub password: String,
    #[garde(custom(validate_name))]
    pub first_name: String,
    #[garde(custom(validate_name))]
    pub last_name: String,
}

/// The request payload for login.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The response payload for a successful login or registration.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub id: i64,
    pub first_name: String,
}

/// The response payload for logout.
#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// The response payload for session checks.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
}

/// Builds the session cookie. It lives exactly as long as the session.
fn create_session_cookie(token: String, cookie_config: &CookieConfig, ttl: chrono::Duration) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);

    cookie.set_http_only(true);
    cookie.set_secure(cookie_config.secure);
    cookie.set_same_site(cookie_config.same_site);
    cookie.set_max_age(Duration::seconds(ttl.num_seconds()));
    cookie.set_path("/");

    cookie
}

fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_max_age(Duration::seconds(0));
    cookie.set_path("/");
    cookie
}

/// Handles account registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response> {
    tracing::info!("📝 Register attempt for: {}", payload.email);
    payload.validate()?;

    let signed_in = auth_service::register(
        &state,
        payload.email,
        &payload.password,
        payload.first_name,
        payload.last_name,
    )
    .await?;

    cookies.add(create_session_cookie(
        signed_in.token,
        &state.config.cookie,
        state.sessions.ttl(),
    ));
    tracing::info!("✅ Account registered: {}", signed_in.account.id);

    let response = AuthResponse {
        success: true,
        id: signed_in.account.id,
        first_name: signed_in.account.first_name,
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handles login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt for: {}", payload.email);

    let signed_in = auth_service::login(&state, &payload.email, &payload.password).await?;

    cookies.add(create_session_cookie(
        signed_in.token,
        &state.config.cookie,
        state.sessions.ttl(),
    ));
    tracing::info!("✅ Account logged in: {}", signed_in.account.id);

    let response = AuthResponse {
        success: true,
        id: signed_in.account.id,
        first_name: signed_in.account.first_name,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles logout. Works with or without a live session.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    if let Some(token) = extract_session_token(&cookies) {
        state.sessions.revoke(&token).await?;
    }

    cookies.remove(expired_session_cookie());

    Ok((StatusCode::OK, Json(LogoutResponse { success: true })).into_response())
}

/// Reports the identity behind a session. Sits behind `require_auth`.
#[axum::debug_handler]
pub async fn check_session(Extension(identity): Extension<Identity>) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse {
        authenticated: true,
        account_id: Some(identity.account_id),
    })
}

/// Reports whether the caller has a valid session, without rejecting.
#[axum::debug_handler]
pub async fn check_session_status(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<SessionStatusResponse>> {
    let identity = match extract_session_token(&cookies) {
        Some(token) => state.sessions.validate(&token).await?,
        None => None,
    };

    Ok(Json(SessionStatusResponse {
        authenticated: identity.is_some(),
        account_id: identity.map(|i| i.account_id),
    }))
}
