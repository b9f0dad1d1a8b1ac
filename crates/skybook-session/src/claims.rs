//! Claims carried by a session token.

use chrono::{DateTime, Utc};
use skybook_core::Role;
use std::collections::BTreeSet;
use std::time::Duration;

/// The claims embedded in (and extracted from) a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub email: String,
    pub roles: BTreeSet<Role>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Time left until expiry, clamped to zero for expired tokens.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
