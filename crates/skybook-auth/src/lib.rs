//! # skybook-auth
//!
//! Authentication service for Skybook.
//!
//! This crate ties the lower layers together into the operations the HTTP
//! surface exposes:
//! - Registration: token check, ceremony options, attestation verification,
//!   device attachment, token consumption
//! - Authentication: ceremony options, assertion verification, counter
//!   advancement, session issue
//! - Registration token management and first-boot bootstrap
//! - Role administration
//!
//! The service is storage-agnostic: it holds `Arc<dyn UserStore>` and
//! `Arc<dyn RegistrationTokenStore>` and never touches a backend directly.

pub mod challenge;
pub mod error;
pub mod service;
pub mod tokens;

pub use error::AuthError;
pub use service::{AuthService, SessionHandle};
pub use tokens::RegistrationTokenService;
