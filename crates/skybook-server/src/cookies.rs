//! Session cookie handling.

use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use std::time::Duration;

/// Name of the HTTP-only session cookie.
pub const SESSION_COOKIE: &str = "skybook-auth";

/// `Set-Cookie` value carrying a session token.
pub fn session_cookie(token: &str, max_age: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        max_age.as_secs()
    )
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0")
}

/// Pull a session token from the request: the session cookie first, then a
/// bearer Authorization header for non-browser clients.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(raw) = headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=')
                && name == SESSION_COOKIE
                && !value.is_empty()
            {
                return Some(value.to_string());
            }
        }
    }
    if let Some(raw) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
        && let Some(token) = raw.strip_prefix("Bearer ")
        && !token.trim().is_empty()
    {
        return Some(token.trim().to_string());
    }
    None
}
