mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use booking_desk::repositories::store::SessionStore;
use common::{BrokenSessionStore, TestContext};

const PASSWORD: &str = "SecurePass123!@#";

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_issues_http_only_session_cookie() {
        let context = TestContext::new();

        let response = context.register("owner@example.com", PASSWORD).await;

        assert_eq!(response.status, StatusCode::CREATED, "Registration failed");
        assert_eq!(response.json["success"], true);
        assert_eq!(response.json["firstName"], "Sam");
        assert!(response.json["id"].is_i64());
        assert!(response.json.get("passwordHash").is_none());

        let set_cookie = response.set_cookie_header().expect("sid cookie not set");
        assert!(set_cookie.contains("HttpOnly"), "{}", set_cookie);
        assert!(set_cookie.contains("Path=/"), "{}", set_cookie);
        assert!(set_cookie.contains("Max-Age=86400"), "{}", set_cookie);
        assert!(set_cookie.contains("SameSite=Lax"), "{}", set_cookie);
        assert!(!set_cookie.contains("Secure"), "{}", set_cookie);

        let token = response.session_cookie().unwrap();
        let check = context.send(Method::GET, "/check-session", None, Some(&token)).await;
        assert_eq!(check.status, StatusCode::OK);
        assert_eq!(check.json["accountId"], response.json["id"]);
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let context = TestContext::new();
        assert_eq!(context.register("owner@example.com", PASSWORD).await.status, StatusCode::CREATED);

        let second = context.register("owner@example.com", PASSWORD).await;
        assert_eq!(second.status, StatusCode::CONFLICT);
        assert!(second.session_cookie().is_none());
    }

    #[tokio::test]
    async fn registration_rejects_weak_password() {
        let context = TestContext::new();
        let response = context.register("owner@example.com", "short").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.session_cookie().is_none());
    }

    #[tokio::test]
    async fn login_resolves_account_through_middleware() {
        let context = TestContext::new();
        let registered = context.register("owner@example.com", PASSWORD).await;

        let login = context.login("owner@example.com", PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "Login failed");
        assert_eq!(login.json["id"], registered.json["id"]);
        assert_eq!(login.json["firstName"], "Sam");

        let token = login.session_cookie().expect("login sets sid");
        assert_ne!(Some(token.clone()), registered.session_cookie());

        let check = context.send(Method::GET, "/check-session", None, Some(&token)).await;
        assert_eq!(check.status, StatusCode::OK);
        assert_eq!(check.json["authenticated"], true);
        assert_eq!(check.json["accountId"], registered.json["id"]);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let context = TestContext::new();
        context.register("owner@example.com", PASSWORD).await;

        let wrong_password = context.login("owner@example.com", "not-the-password").await;
        let unknown_email = context.login("nobody@example.com", PASSWORD).await;
        let wrong_case = context.login("Owner@example.com", PASSWORD).await;

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.status, unknown_email.status);
        assert_eq!(wrong_password.raw, unknown_email.raw);
        assert_eq!(wrong_password.raw, wrong_case.raw);
        assert!(wrong_password.session_cookie().is_none());
        assert!(unknown_email.session_cookie().is_none());
    }

    #[tokio::test]
    async fn created_session_cookie_resolves_account_42() {
        let context = TestContext::new();
        let token = context.state.sessions.create(42).await.unwrap();

        let check = context.send(Method::GET, "/check-session", None, Some(&token)).await;
        assert_eq!(check.status, StatusCode::OK);
        assert_eq!(check.json["accountId"], 42);
    }

    #[tokio::test]
    async fn missing_or_forged_cookie_is_unauthorized() {
        let context = TestContext::new();

        let missing = context.send(Method::GET, "/check-session", None, None).await;
        assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
        assert_eq!(missing.json["error"], "Unauthorized");

        let forged = context
            .send(Method::GET, "/clients", None, Some("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"))
            .await;
        assert_eq!(forged.status, StatusCode::UNAUTHORIZED);

        let empty = context.send(Method::GET, "/bookings", None, Some("")).await;
        assert_eq!(empty.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_session_is_rejected_before_sweep() {
        let context = TestContext::new();
        let token = context.staff_session().await;

        context.clock.advance(chrono::Duration::hours(23));
        let still_valid = context.send(Method::GET, "/check-session", None, Some(&token)).await;
        assert_eq!(still_valid.status, StatusCode::OK);

        context.clock.advance(chrono::Duration::hours(1));
        let expired = context.send(Method::GET, "/check-session", None, Some(&token)).await;
        assert_eq!(expired.status, StatusCode::UNAUTHORIZED);

        // Row still present until the sweep runs.
        assert!(context.store.find_session(&token).await.unwrap().is_some());
        assert_eq!(context.state.sessions.sweep().await.unwrap(), 1);
        assert!(context.store.find_session(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn middleware_does_not_extend_expiry() {
        let context = TestContext::new();
        let token = context.staff_session().await;
        let before = context.store.find_session(&token).await.unwrap().unwrap();

        context.clock.advance(chrono::Duration::hours(12));
        context.send(Method::GET, "/check-session", None, Some(&token)).await;

        let after = context.store.find_session(&token).await.unwrap().unwrap();
        assert_eq!(before.expires_at, after.expires_at);
    }

    #[tokio::test]
    async fn session_status_reports_without_rejecting() {
        let context = TestContext::new();

        let anonymous = context.send(Method::GET, "/check-session-status", None, None).await;
        assert_eq!(anonymous.status, StatusCode::OK);
        assert_eq!(anonymous.json["authenticated"], false);

        let token = context.state.sessions.create(9).await.unwrap();
        let signed_in = context
            .send(Method::GET, "/check-session-status", None, Some(&token))
            .await;
        assert_eq!(signed_in.json["authenticated"], true);
        assert_eq!(signed_in.json["accountId"], 9);
    }

    #[tokio::test]
    async fn logout_revokes_the_session() {
        let context = TestContext::new();
        let token = context.staff_session().await;

        let logout = context.send(Method::POST, "/logout", None, Some(&token)).await;
        assert_eq!(logout.status, StatusCode::OK);

        let check = context.send(Method::GET, "/check-session", None, Some(&token)).await;
        assert_eq!(check.status, StatusCode::UNAUTHORIZED);

        let again = context.send(Method::POST, "/logout", None, Some(&token)).await;
        assert_eq!(again.status, StatusCode::OK);
        let anonymous = context.send(Method::POST, "/logout", None, None).await;
        assert_eq!(anonymous.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn failed_session_write_sets_no_cookie() {
        let context = TestContext::with_session_store(Arc::new(BrokenSessionStore));

        let response = context.register("owner@example.com", PASSWORD).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json["error"], "Internal server error");
        assert!(response.set_cookie_header().is_none());
    }
}
