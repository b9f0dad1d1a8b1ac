//! One-time registration tokens.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single-use token that authorizes one registration ceremony.
///
/// Tokens are minted by an administrator (or at bootstrap) and consumed
/// exactly once when a registration completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationTokenRecord {
    pub key: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Whether the account created with this token may later be deleted.
    /// The bootstrap token mints a permanent admin and sets this to false.
    pub user_is_deletable: bool,
}

impl RegistrationTokenRecord {
    pub fn new(now: DateTime<Utc>, lifetime: chrono::Duration, user_is_deletable: bool) -> Self {
        Self {
            key: Uuid::new_v4(),
            created_at: now,
            expires_at: now + lifetime,
            user_is_deletable,
        }
    }

    /// Expired tokens behave exactly like absent ones.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let record = RegistrationTokenRecord::new(now, chrono::Duration::minutes(15), true);
        assert!(!record.is_expired(now));
        assert!(!record.is_expired(now + chrono::Duration::minutes(14)));
        assert!(record.is_expired(record.expires_at));
        assert!(record.is_expired(now + chrono::Duration::minutes(16)));
    }
}
