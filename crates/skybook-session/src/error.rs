//! Error types for the session crate.

use skybook_core::config::MIN_SECRET_LEN;
use thiserror::Error;

/// Errors that can occur while issuing or verifying session tokens.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configured secret is too short to derive a key from.
    #[error("session secret must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,

    /// The derived key material was rejected.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// The configured session lifetime cannot be represented.
    #[error("invalid session lifetime: {0}")]
    InvalidLifetime(String),

    /// Failed to build or sign a token.
    #[error("failed to create token: {0}")]
    TokenCreationFailed(String),

    /// The token is not a valid Biscuit signed by our key.
    #[error("failed to parse token: {0}")]
    TokenParseFailed(String),

    /// The token parsed but authorization failed.
    #[error("token verification failed: {0}")]
    VerificationFailed(String),

    /// The token is past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// A required claim was missing from the token.
    #[error("missing claim: {claim}")]
    MissingClaim { claim: String },
}
