use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use rand::rngs::OsRng;

/// The size of the session token in bytes (256 bits).
pub const SESSION_TOKEN_SIZE: usize = 32;

/// Generates a new random session token.
///
/// The token carries no account or time information; it is pure OS entropy.
///
/// # Returns
///
/// A URL-safe base64-encoded token, safe to place in a cookie unescaped.
pub fn generate_session_token() -> String {
    let mut token = [0u8; SESSION_TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

/// Returns a short prefix of a token for log lines.
pub fn token_prefix(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    &token[..end]
}
