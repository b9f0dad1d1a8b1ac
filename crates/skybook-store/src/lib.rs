//! # skybook-store
//!
//! Persistence layer for Skybook.
//!
//! This crate provides functionality for:
//! - Storing users, their roles, and their registered device credential
//! - Holding the single pending ceremony challenge per user
//! - Storing one-time registration tokens with expiry
//!
//! Two backends implement the [`UserStore`] and [`RegistrationTokenStore`]
//! traits: [`MemoryStore`] (process-local, for tests and ephemeral runs) and
//! [`SqliteStore`] (durable, via sqlx).
//!
//! ## Atomicity
//!
//! The operations that decide security outcomes are atomic at the store
//! level: `take_challenge` reads and clears in one step so a challenge can
//! only ever be used once, and `consume` deletes a registration token in the
//! same step that returns it so exactly one caller wins a race.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod token;
pub mod user;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{RegistrationTokenStore, UserStore};
pub use token::RegistrationTokenRecord;
pub use user::{DeviceCredential, PendingChallenge, UserRecord};
