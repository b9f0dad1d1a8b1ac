//! Hashed subject identities.
//!
//! Users are addressed by the SHA-256 digest of their email address. The
//! digest is the only lookup key the stores ever see; the plaintext email
//! appears in session claims and request bodies but is never persisted as
//! an index.

use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Opaque subject identifier derived from an email address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity([u8; 32]);

/// Error parsing a hex-encoded identity.
#[derive(Debug, Error)]
#[error("invalid identity encoding: {0}")]
pub struct IdentityParseError(String);

impl Identity {
    /// Derive the identity for an email address.
    ///
    /// Deterministic and one-way; surrounding whitespace is ignored.
    pub fn from_email(email: &str) -> Self {
        let digest = Sha256::digest(email.trim().as_bytes());
        Self(digest.into())
    }

    /// Raw digest bytes, used as the WebAuthn user handle.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding, used as the store key.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02x}")).collect()
    }

    /// Parse an identity back from its hex encoding.
    pub fn from_hex(hex: &str) -> Result<Self, IdentityParseError> {
        if hex.len() != 64 {
            return Err(IdentityParseError(format!(
                "expected 64 hex characters, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| IdentityParseError("non-ascii input".to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| IdentityParseError(format!("invalid hex pair {pair:?}")))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_deterministic() {
        let a = Identity::from_email("u@example.com");
        let b = Identity::from_email("u@example.com");
        assert_eq!(a, b);
        assert_ne!(a, Identity::from_email("v@example.com"));
    }

    #[test]
    fn test_identity_ignores_surrounding_whitespace() {
        assert_eq!(
            Identity::from_email("  u@example.com "),
            Identity::from_email("u@example.com")
        );
    }

    #[test]
    fn test_identity_does_not_leak_email() {
        let hex = Identity::from_email("secret@example.com").to_hex();
        assert_eq!(hex.len(), 64);
        assert!(!hex.contains("secret"));
    }

    #[test]
    fn test_identity_hex_roundtrip() {
        let identity = Identity::from_email("u@example.com");
        let parsed = Identity::from_hex(&identity.to_hex()).unwrap();
        assert_eq!(identity, parsed);
    }

    #[test]
    fn test_identity_from_hex_rejects_garbage() {
        assert!(Identity::from_hex("zz").is_err());
        assert!(Identity::from_hex(&"g".repeat(64)).is_err());
    }
}
