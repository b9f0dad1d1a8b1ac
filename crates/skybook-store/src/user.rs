//! User records and the credential material attached to them.

use chrono::{DateTime, Utc};
use skybook_core::{Identity, Role};
use std::collections::BTreeSet;

/// A registered device credential (public key plus replay state).
///
/// Each user holds at most one of these; registering a second device is
/// rejected at the store level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCredential {
    /// The credential id as the authenticator reported it.
    pub credential_id: Vec<u8>,
    /// COSE-encoded public key bytes.
    pub public_key: Vec<u8>,
    /// Highest signature counter seen so far.
    pub counter: u32,
}

/// The single ceremony challenge currently pending for a user.
///
/// Issuing a new challenge replaces this; taking it clears it. The issue
/// time lets the caller enforce a ceremony deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChallenge {
    pub value: String,
    pub issued_at: DateTime<Utc>,
}

/// A stored user.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub identity: Identity,
    pub created_at: DateTime<Utc>,
    /// Whether this account may ever be removed. The bootstrap user is not.
    pub deletable: bool,
    pub roles: BTreeSet<Role>,
    pub current_challenge: Option<PendingChallenge>,
    pub device: Option<DeviceCredential>,
}

impl UserRecord {
    /// A fresh record with no roles, no challenge, and no device.
    pub fn new(identity: Identity, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            created_at: now,
            deletable: true,
            roles: BTreeSet::new(),
            current_challenge: None,
            device: None,
        }
    }

    /// Whether a registration ceremony has completed for this user.
    pub fn is_registered(&self) -> bool {
        self.device.is_some()
    }
}
