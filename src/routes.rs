use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use http::{header, HeaderValue, Method};
use tower_cookies::CookieManagerLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    error::{AppError, Result},
    handlers, middleware_layer,
    state::AppState,
};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Builds the full application router.
///
/// `/login` and `/register` are rate limited per client IP when
/// `auth_rate_limit` is set; that limiter needs the server to provide
/// `ConnectInfo<SocketAddr>`.
pub fn build_router(state: AppState) -> Result<Router> {
    let mut auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        .with_state(state.clone());

    if state.config.auth_rate_limit {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(2)
                .burst_size(10)
                .use_headers()
                .finish()
                .ok_or_else(|| AppError::Internal("invalid rate limit configuration".to_string()))?,
        );
        auth_routes = auth_routes.layer(tower_governor::GovernorLayer::new(governor_conf));
    }

    let public_routes = Router::new()
        .route("/submit", post(handlers::inquiry::submit))
        .route(
            "/feed",
            get(handlers::feed::list_feed).merge(
                post(handlers::feed::create_feed_item).route_layer(from_fn_with_state(
                    state.clone(),
                    middleware_layer::auth::require_auth,
                )),
            ),
        )
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/check-session-status",
            get(handlers::auth::check_session_status),
        )
        .route("/health", get(|| async { "ok" }))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/check-session", get(handlers::auth::check_session))
        .route("/inquiry-status", post(handlers::inquiry::set_status))
        .route("/clients", get(handlers::clients::list_clients))
        .route(
            "/clients/{client_id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/clients/{client_id}/booking",
            get(handlers::clients::get_client_booking),
        )
        .route("/bookings", get(handlers::bookings::list_bookings))
        .route(
            "/bookings/{booking_id}",
            get(handlers::bookings::get_booking)
                .put(handlers::bookings::update_booking)
                .delete(handlers::bookings::delete_booking),
        )
        .route(
            "/feed/{item_id}",
            axum::routing::put(handlers::feed::update_feed_item)
                .delete(handlers::feed::delete_feed_item),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    let app = Router::new()
        .merge(auth_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&state));

    Ok(app)
}
