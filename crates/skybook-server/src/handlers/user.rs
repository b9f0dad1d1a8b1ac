//! User administration endpoints (admin only).

use crate::error::ApiError;
use crate::state::SharedState;
use crate::validation::{parse_email, parse_roles};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::{Value, json};

/// `POST /user` - mint a registration token for a new account.
pub async fn create(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let record = state.auth.issue_registration_token().await?;
    let lifetime =
        humantime::format_duration(state.config.registration_token_lifetime).to_string();
    let body = Json(json!({ "token": record.key, "lifetime": lifetime }));
    Ok((StatusCode::CREATED, body))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolesBody {
    #[serde(default)]
    pub add_roles: Vec<String>,
    #[serde(default)]
    pub remove_roles: Vec<String>,
}

/// `PUT /user/{email}` - adjust an account's roles and return the result.
pub async fn update_roles(
    State(state): State<SharedState>,
    Path(email): Path<String>,
    Json(body): Json<RolesBody>,
) -> Result<Json<Value>, ApiError> {
    let email = parse_email(&email)?;
    let add = parse_roles(&body.add_roles)?;
    let remove = parse_roles(&body.remove_roles)?;
    let roles = state.auth.update_roles(&email, &add, &remove).await?;
    Ok(Json(json!({ "email": email, "roles": roles })))
}
