//! Session introspection and logout.

use crate::cookies::clear_cookie;
use crate::middleware::auth::Session;
use axum::Extension;
use axum::Json;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use chrono::Utc;
use serde_json::{Value, json};

/// `GET /authentication/verify` - echo the verified session.
pub async fn verify(Extension(Session(claims)): Extension<Session>) -> Json<Value> {
    let remaining = claims.remaining_lifetime(Utc::now());
    Json(json!({
        "email": claims.email,
        "roles": claims.roles,
        "expiresIn": remaining.as_millis() as u64,
    }))
}

/// `GET /authentication/logout` - clear the session cookie. Tokens are
/// stateless, so this is purely a client-side discard.
pub async fn logout() -> impl IntoResponse {
    ([(SET_COOKIE, clear_cookie())], Json(json!({ "ok": true })))
}
