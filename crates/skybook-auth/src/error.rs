//! Error types for the authentication service.

use skybook_passkey::PasskeyError;
use skybook_session::SessionError;
use skybook_store::StoreError;
use thiserror::Error;

/// Errors produced by authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A request parameter failed validation.
    #[error("invalid request: {0}")]
    Validation(String),

    /// No account exists for the given email.
    #[error("user not found")]
    UserNotFound,

    /// The registration token does not exist, was consumed, or expired.
    #[error("registration token not found")]
    TokenNotFound,

    /// The account already completed registration.
    #[error("user is already registered")]
    AlreadyRegistered,

    /// The account has no device credential yet.
    #[error("user has not completed registration")]
    NotRegistered,

    /// No ceremony is in flight for this account.
    #[error("no pending challenge")]
    NoPendingChallenge,

    /// The pending challenge outlived the ceremony deadline.
    #[error("challenge expired")]
    ChallengeExpired,

    /// Ceremony verification failed.
    #[error(transparent)]
    Ceremony(#[from] PasskeyError),

    /// Session token failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}
