//! Authentication ceremony endpoints.

use crate::cookies::session_cookie;
use crate::error::ApiError;
use crate::state::SharedState;
use crate::validation::parse_email;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use skybook_passkey::{AuthenticationOptions, AuthenticationResponse};

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub email: String,
}

/// `GET /authentication/login` - hand out ceremony options for the stored
/// credential.
pub async fn options(
    State(state): State<SharedState>,
    Query(query): Query<LoginQuery>,
) -> Result<Json<AuthenticationOptions>, ApiError> {
    let email = parse_email(&query.email)?;
    let options = state.auth.begin_authentication(&email).await?;
    Ok(Json(options))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub assertion_response: AuthenticationResponse,
}

/// `POST /authentication/login` - verify the assertion, set the session
/// cookie, and echo the session summary.
pub async fn complete(
    State(state): State<SharedState>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
    let email = parse_email(&body.email)?;
    let session = state
        .auth
        .finish_authentication(&email, &body.assertion_response)
        .await?;

    let remaining = session.claims.remaining_lifetime(Utc::now());
    let cookie = session_cookie(&session.token, remaining);
    let body = Json(json!({
        "email": session.claims.email,
        "roles": session.claims.roles,
        "expiresIn": remaining.as_millis() as u64,
    }));
    Ok(([(SET_COOKIE, cookie)], body))
}
