//! HTTP error responses.
//!
//! Every error leaves the server as `{"error": {"status": n, "message": m}}`.
//! Internal failures are logged with detail and reported without it.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use skybook_auth::AuthError;
use skybook_passkey::PasskeyError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "status": self.status.as_u16(),
                "message": self.message,
            }
        }));
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::Validation(_)
            | AuthError::NoPendingChallenge
            | AuthError::ChallengeExpired => Self::bad_request(err.to_string()),

            AuthError::Ceremony(ceremony) => match ceremony {
                PasskeyError::ChallengeMismatch
                | PasskeyError::Malformed(_)
                | PasskeyError::UnsupportedAlgorithm(_) => Self::bad_request(err.to_string()),
                PasskeyError::CeremonyFailed(_) | PasskeyError::ReplayDetected { .. } => {
                    Self::unauthorized(err.to_string())
                }
            },

            AuthError::AlreadyRegistered | AuthError::NotRegistered => {
                Self::forbidden(err.to_string())
            }

            AuthError::UserNotFound | AuthError::TokenNotFound => Self::not_found(err.to_string()),

            AuthError::Session(_) | AuthError::Store(_) => {
                tracing::error!(error = %err, "request failed");
                Self::internal()
            }
        }
    }
}
