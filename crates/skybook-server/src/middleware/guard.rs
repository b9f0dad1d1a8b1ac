//! Role-based route guard.
//!
//! Runs inside [`super::auth::require_session`], so the session extension is
//! always present on the paths it protects.

use crate::error::ApiError;
use crate::middleware::auth::Session;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use skybook_core::{Role, authorize};

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Reject the request unless the session holds one of `required`. An empty
/// `required` slice admits any authenticated caller.
pub async fn require_roles(
    required: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = req
        .extensions()
        .get::<Session>()
        .ok_or_else(|| ApiError::unauthorized("missing session"))?;

    if !authorize(required, &session.0.roles) {
        tracing::debug!(
            email = %session.0.email,
            ?required,
            "role check failed"
        );
        return Err(ApiError::forbidden("insufficient privileges"));
    }
    Ok(next.run(req).await)
}
