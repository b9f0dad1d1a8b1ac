//! Registration token management.

use crate::error::AuthError;
use chrono::Utc;
use skybook_store::{RegistrationTokenRecord, RegistrationTokenStore};
use std::sync::Arc;
use uuid::Uuid;

pub struct RegistrationTokenService {
    store: Arc<dyn RegistrationTokenStore>,
    lifetime: chrono::Duration,
}

impl RegistrationTokenService {
    pub fn new(
        store: Arc<dyn RegistrationTokenStore>,
        lifetime: std::time::Duration,
    ) -> Result<Self, AuthError> {
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|e| AuthError::Validation(format!("registration token lifetime: {e}")))?;
        Ok(Self { store, lifetime })
    }

    pub fn lifetime(&self) -> chrono::Duration {
        self.lifetime
    }

    /// Mint and store a fresh token.
    pub async fn issue(&self, user_is_deletable: bool) -> Result<RegistrationTokenRecord, AuthError> {
        let record = RegistrationTokenRecord::new(Utc::now(), self.lifetime, user_is_deletable);
        self.store.insert(record.clone()).await?;
        tracing::info!(token = %record.key, deletable = user_is_deletable, "registration token issued");
        Ok(record)
    }

    /// Look a token up without consuming it. Used when handing out ceremony
    /// options; the token survives for the completing POST.
    pub async fn check(&self, key: &Uuid) -> Result<RegistrationTokenRecord, AuthError> {
        self.store
            .peek(key, Utc::now())
            .await?
            .ok_or(AuthError::TokenNotFound)
    }

    /// Consume a token; exactly one concurrent caller gets the record.
    pub async fn consume(&self, key: &Uuid) -> Result<RegistrationTokenRecord, AuthError> {
        self.store
            .consume(key, Utc::now())
            .await?
            .ok_or(AuthError::TokenNotFound)
    }
}
