//! Session-verifying middleware.

use crate::cookies::extract_token;
use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use skybook_session::SessionClaims;

/// The verified session, injected as a request extension for handlers and
/// the role guard downstream.
#[derive(Clone, Debug)]
pub struct Session(pub SessionClaims);

/// Axum middleware requiring a valid session token (cookie or bearer).
pub async fn require_session(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers())
        .ok_or_else(|| ApiError::unauthorized("missing session token"))?;

    let claims = state.sessions.verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "session token rejected");
        ApiError::unauthorized("invalid session token")
    })?;

    req.extensions_mut().insert(Session(claims));
    Ok(next.run(req).await)
}
