//! # skybook-server
//!
//! HTTP surface of Skybook's passwordless authentication service.
//!
//! Public endpoints drive the two WebAuthn ceremonies; everything else sits
//! behind session-verifying middleware, with the user administration routes
//! additionally guarded by the `admin` role.

pub mod cookies;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod validation;

use anyhow::Context;
use skybook_auth::AuthService;
use skybook_core::Config;
use skybook_session::{SessionIssuer, SessionKeys, SessionVerifier};
use skybook_store::{MemoryStore, RegistrationTokenStore, SqliteStore, UserStore};
use state::{AppState, SharedState};
use std::sync::Arc;

pub use routes::router;

/// Wire up stores, keys, and the auth service from configuration.
pub async fn build_state(config: Config) -> anyhow::Result<SharedState> {
    let (users, tokens): (Arc<dyn UserStore>, Arc<dyn RegistrationTokenStore>) =
        match &config.database_url {
            Some(url) => {
                let store = Arc::new(
                    SqliteStore::connect(url)
                        .await
                        .with_context(|| format!("opening database {url}"))?,
                );
                (store.clone(), store)
            }
            None => {
                tracing::warn!("no database configured; state is in-memory and lost on restart");
                let store = Arc::new(MemoryStore::new());
                (store.clone(), store)
            }
        };

    let keys = SessionKeys::derive(&config.session.secret)?;
    let sessions = SessionVerifier::new(keys.public_key());
    let issuer = SessionIssuer::new(keys, config.session.lifetime)?;

    let auth = AuthService::new(
        users,
        tokens,
        issuer,
        config.relying_party.clone(),
        config.registration_token_lifetime,
    )?;

    Ok(Arc::new(AppState {
        config,
        auth,
        sessions,
    }))
}
