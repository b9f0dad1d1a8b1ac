//! Shared application state.

use skybook_auth::AuthService;
use skybook_core::Config;
use skybook_session::SessionVerifier;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub sessions: SessionVerifier,
}

pub type SharedState = Arc<AppState>;
