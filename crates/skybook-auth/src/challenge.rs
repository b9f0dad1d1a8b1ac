//! Ceremony challenge lifecycle.
//!
//! One challenge per identity: issuing a new one replaces whatever was
//! pending, and taking one clears it before any verification runs. A
//! rejected ceremony therefore burns the challenge either way.

use crate::error::AuthError;
use chrono::{DateTime, Utc};
use skybook_core::Identity;
use skybook_passkey::generate_challenge;
use skybook_store::{PendingChallenge, UserStore};
use std::sync::Arc;

/// How long a pending challenge stays valid. Matches the ceremony timeout
/// advertised to the client.
pub const CHALLENGE_TTL: chrono::Duration = chrono::Duration::seconds(60);

pub struct ChallengeManager {
    users: Arc<dyn UserStore>,
}

impl ChallengeManager {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Mint and store a fresh challenge for `identity`, superseding any
    /// previously pending one.
    pub async fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        let value = generate_challenge();
        self.users
            .put_challenge(
                identity,
                PendingChallenge {
                    value: value.clone(),
                    issued_at: Utc::now(),
                },
            )
            .await?;
        Ok(value)
    }

    /// Atomically take the pending challenge. Fails if none is pending or
    /// the pending one is older than [`CHALLENGE_TTL`]; in both cases the
    /// store no longer holds a challenge afterwards.
    pub async fn take(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let pending = self
            .users
            .take_challenge(identity)
            .await?
            .ok_or(AuthError::NoPendingChallenge)?;
        if now - pending.issued_at > CHALLENGE_TTL {
            return Err(AuthError::ChallengeExpired);
        }
        Ok(pending.value)
    }
}
