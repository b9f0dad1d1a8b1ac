//! # skybook-passkey
//!
//! WebAuthn ceremony layer for Skybook.
//!
//! This crate provides functionality for:
//! - Generating one-time ceremony challenges
//! - Building registration and authentication options for the browser API
//! - Verifying attestation responses (device registration)
//! - Verifying assertion responses (authentication) with counter-based
//!   replay protection
//!
//! ## Verification model
//!
//! The caller owns challenge storage: every verify function takes the
//! expected challenge, origin, and relying-party id explicitly and never
//! touches persistent state. Attestation statements are checked for
//! self-attestation (`packed` without a certificate chain); full chain
//! validation is outside this crate.
//!
//! Supported credential algorithms: ES256 (ECDSA P-256, the dominant
//! passkey algorithm) and EdDSA (Ed25519).

pub mod assertion;
pub mod authenticator;
pub mod cose;
pub mod error;
pub mod options;
pub mod registration;
pub mod response;
#[cfg(test)]
pub(crate) mod testutil;

pub use assertion::verify_authentication;
pub use authenticator::AuthenticatorData;
pub use cose::CoseKey;
pub use error::PasskeyError;
pub use options::{
    AuthenticationOptions, CredentialDescriptor, RegistrationOptions, generate_challenge,
};
pub use registration::{RegisteredCredential, verify_registration};
pub use response::{AuthenticationResponse, RegistrationResponse};
