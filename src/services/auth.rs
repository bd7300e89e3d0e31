use crate::crypto::password::{hash_password, verify_password, verify_against_dummy};
use crate::error::{AppError, Result};
use crate::models::account::{Account, NewAccount};
use crate::state::AppState;

/// An account that just signed in, with the token of its new session.
pub struct SignedIn {
    pub account: Account,
    pub token: String,
}

/// Checks an email/password pair against the stored hash.
///
/// Unknown email and wrong password both fail with
/// `AppError::InvalidCredentials`, after the same amount of hashing work.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `email` - The email, matched exactly as stored.
/// * `password` - The submitted password.
///
/// # Returns
///
/// A `Result` containing the authenticated `Account`.
pub async fn verify_credentials(state: &AppState, email: &str, password: &str) -> Result<Account> {
    tracing::debug!("🔐 Verifying credentials for: {}", email);

    let Some(account) = state.store.find_account_by_email(email).await? else {
        verify_against_dummy(password);
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &account.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    Ok(account)
}

/// Authenticates a user and issues a session.
///
/// # Returns
///
/// A `Result` containing the account and the new session token.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<SignedIn> {
    let account = verify_credentials(state, email, password).await?;
    let token = state.sessions.create(account.id).await?;

    tracing::info!("✅ Account authenticated: {}", account.id);
    Ok(SignedIn { account, token })
}

/// Creates a new account and signs it in.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `email` - The account email; must be unused.
/// * `password` - The plaintext password, hashed before storage.
/// * `first_name` - The account holder's first name.
/// * `last_name` - The account holder's last name.
///
/// # Returns
///
/// A `Result` containing the created account and its session token.
pub async fn register(
    state: &AppState,
    email: String,
    password: &str,
    first_name: String,
    last_name: String,
) -> Result<SignedIn> {
    tracing::debug!("🔐 Creating account: {}", email);
    let password_hash = hash_password(password)?;

    let account = state
        .store
        .insert_account(NewAccount {
            email,
            first_name,
            last_name,
            password_hash,
        })
        .await?;
    tracing::info!("✅ Account created with ID: {}", account.id);

    let token = state.sessions.create(account.id).await?;
    Ok(SignedIn { account, token })
}
