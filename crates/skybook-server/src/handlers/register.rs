//! Registration ceremony endpoints.

use crate::error::ApiError;
use crate::state::SharedState;
use crate::validation::{parse_email, parse_token};
use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use skybook_passkey::{RegistrationOptions, RegistrationResponse};

#[derive(Debug, Deserialize)]
pub struct RegisterQuery {
    pub email: String,
    pub token: String,
}

/// `GET /authentication/register` - hand out ceremony options. The
/// registration token is checked but stays valid for the completing POST.
pub async fn options(
    State(state): State<SharedState>,
    Query(query): Query<RegisterQuery>,
) -> Result<Json<RegistrationOptions>, ApiError> {
    let email = parse_email(&query.email)?;
    let token = parse_token(&query.token)?;
    let options = state.auth.begin_registration(&email, &token).await?;
    Ok(Json(options))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub email: String,
    pub token: String,
    pub attestation_response: RegistrationResponse,
}

/// `POST /authentication/register` - verify the attestation, consume the
/// token, and return the first session token.
pub async fn complete(
    State(state): State<SharedState>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<Value>, ApiError> {
    let email = parse_email(&body.email)?;
    let token = parse_token(&body.token)?;
    let session = state
        .auth
        .finish_registration(&email, &token, &body.attestation_response)
        .await?;
    Ok(Json(json!({ "accesstoken": session.token })))
}
