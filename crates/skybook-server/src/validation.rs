//! Request parameter validation.

use crate::error::ApiError;
use skybook_core::Role;
use std::str::FromStr;
use uuid::Uuid;

/// Normalize and sanity-check an email address. The canonical (trimmed,
/// lowercased) form is what identities are derived from.
pub fn parse_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_ascii_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ApiError::bad_request("email must contain '@'"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(ApiError::bad_request("email is not valid"));
    }
    Ok(email)
}

/// Registration tokens travel as UUID strings.
pub fn parse_token(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::bad_request("registration token must be a UUID"))
}

/// Parse role names from a request body.
pub fn parse_roles(raw: &[String]) -> Result<Vec<Role>, ApiError> {
    raw.iter()
        .map(|name| {
            Role::from_str(name).map_err(|e| ApiError::bad_request(e.to_string()))
        })
        .collect()
}
