//! # skybook-core
//!
//! Shared building blocks for the Skybook authentication service:
//!
//! - Environment-driven configuration, validated at load time
//! - The role model and the any-of authorization guard
//! - Hashed subject identities (emails are never used as lookup keys)
//!
//! Every other Skybook crate depends on this one; it depends on nothing
//! Skybook-specific itself.

pub mod config;
pub mod identity;
pub mod roles;

pub use config::{Config, ConfigError, RelyingParty, SessionConfig};
pub use identity::{Identity, IdentityParseError};
pub use roles::{Role, UnknownRoleError, authorize};
