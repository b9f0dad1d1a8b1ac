//! Keypair derivation for session tokens.

use crate::error::SessionError;
use biscuit_auth::{Algorithm, KeyPair as BiscuitKeyPair, PrivateKey, PublicKey};
use sha2::{Digest, Sha256};
use skybook_core::config::MIN_SECRET_LEN;

/// An Ed25519 keypair for signing and verifying session tokens.
///
/// Derived deterministically from the configured secret: the SHA-256 digest
/// of the secret is the Ed25519 seed. Processes sharing a secret therefore
/// share a keypair without ever exchanging key material.
pub struct SessionKeys {
    inner: BiscuitKeyPair,
}

impl SessionKeys {
    /// Derive a keypair from the session secret.
    pub fn derive(secret: &str) -> Result<Self, SessionError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(SessionError::SecretTooShort);
        }

        let seed: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        let private_key = PrivateKey::from_bytes(&seed, Algorithm::Ed25519)
            .map_err(|e| SessionError::InvalidKey(e.to_string()))?;
        let inner = BiscuitKeyPair::from(&private_key);

        Ok(Self { inner })
    }

    /// Get the inner biscuit keypair.
    pub fn inner(&self) -> &BiscuitKeyPair {
        &self.inner
    }

    /// Get the public (verification) key.
    pub fn public_key(&self) -> PublicKey {
        self.inner.public()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "an-adequately-long-session-secret!!!";

    #[test]
    fn test_derivation_is_deterministic() {
        let a = SessionKeys::derive(SECRET).unwrap();
        let b = SessionKeys::derive(SECRET).unwrap();
        assert_eq!(a.public_key().to_bytes_hex(), b.public_key().to_bytes_hex());
    }

    #[test]
    fn test_different_secrets_different_keys() {
        let a = SessionKeys::derive(SECRET).unwrap();
        let b = SessionKeys::derive("another-adequately-long-secret!!!!!!").unwrap();
        assert_ne!(a.public_key().to_bytes_hex(), b.public_key().to_bytes_hex());
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = SessionKeys::derive("too short").map(|_| ());
        assert!(matches!(result, Err(SessionError::SecretTooShort)));
    }
}
