//! Error types for the store crate.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No user record exists for the given identity.
    #[error("user not found")]
    UserNotFound,

    /// The user already has a registered device credential.
    #[error("a device credential is already attached to this user")]
    DeviceAlreadyAttached,

    /// An in-memory lock was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be decoded.
    #[error("corrupt stored value: {0}")]
    Corrupt(String),
}
