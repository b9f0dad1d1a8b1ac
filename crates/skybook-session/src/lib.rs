//! # skybook-session
//!
//! Signed session tokens for Skybook.
//!
//! This crate provides functionality for:
//! - Deriving a signing keypair from the configured session secret
//! - Issuing session tokens carrying email, roles, and expiry
//! - Verifying tokens and extracting their claims
//!
//! Tokens are Biscuits signed with an Ed25519 key. The key is derived
//! deterministically from the secret, so every process configured with the
//! same secret verifies tokens minted by any of its peers.

pub mod claims;
pub mod error;
pub mod keys;
pub mod token;

pub use claims::SessionClaims;
pub use error::SessionError;
pub use keys::SessionKeys;
pub use token::{SessionIssuer, SessionVerifier};
