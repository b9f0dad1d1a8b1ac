//! Error types for the ceremony layer.

use thiserror::Error;

/// Errors that can occur while building options or verifying responses.
#[derive(Debug, Error)]
pub enum PasskeyError {
    /// The response does not answer the pending challenge.
    #[error("response does not match the pending challenge")]
    ChallengeMismatch,

    /// Cryptographic or relying-party validation failed.
    #[error("ceremony verification failed: {0}")]
    CeremonyFailed(String),

    /// The signature counter did not advance past the stored value.
    #[error("signature counter did not advance (stored {stored}, received {received})")]
    ReplayDetected { stored: u32, received: u32 },

    /// The response could not be decoded at all.
    #[error("malformed ceremony response: {0}")]
    Malformed(String),

    /// The credential uses a COSE algorithm this service does not accept.
    #[error("unsupported credential algorithm: {0}")]
    UnsupportedAlgorithm(i64),
}

impl PasskeyError {
    pub(crate) fn ceremony(reason: impl Into<String>) -> Self {
        PasskeyError::CeremonyFailed(reason.into())
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        PasskeyError::Malformed(reason.into())
    }
}
