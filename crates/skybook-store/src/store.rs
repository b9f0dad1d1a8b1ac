//! Storage backend traits.

use crate::error::StoreError;
use crate::token::RegistrationTokenRecord;
use crate::user::{DeviceCredential, PendingChallenge, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skybook_core::{Identity, Role};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Trait for user storage backends.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by identity.
    async fn find(&self, identity: &Identity) -> Result<Option<UserRecord>, StoreError>;

    /// Record a pending challenge for a user, creating the user record if it
    /// does not exist yet. A previously pending challenge is replaced; the
    /// most recently issued one is the only one that can ever verify.
    async fn put_challenge(
        &self,
        identity: &Identity,
        challenge: PendingChallenge,
    ) -> Result<(), StoreError>;

    /// Atomically read and clear the pending challenge. Whatever the
    /// subsequent ceremony verification decides, the challenge is already
    /// gone and cannot be replayed.
    async fn take_challenge(
        &self,
        identity: &Identity,
    ) -> Result<Option<PendingChallenge>, StoreError>;

    /// Attach a device credential to a user along with the roles and
    /// deletability decided at registration time. Fails with
    /// [`StoreError::DeviceAlreadyAttached`] if the user already has one.
    async fn attach_device(
        &self,
        identity: &Identity,
        device: DeviceCredential,
        deletable: bool,
        roles: BTreeSet<Role>,
    ) -> Result<(), StoreError>;

    /// Persist a new signature counter after a successful authentication.
    async fn advance_counter(&self, identity: &Identity, counter: u32) -> Result<(), StoreError>;

    /// Replace a user's role set.
    async fn set_roles(
        &self,
        identity: &Identity,
        roles: BTreeSet<Role>,
    ) -> Result<(), StoreError>;

    /// Whether any user has completed registration. Drives bootstrap: the
    /// first-run token is only minted when this is false.
    async fn any_registered(&self) -> Result<bool, StoreError>;
}

/// Trait for registration token storage backends.
#[async_trait]
pub trait RegistrationTokenStore: Send + Sync {
    /// Store a freshly minted token.
    async fn insert(&self, record: RegistrationTokenRecord) -> Result<(), StoreError>;

    /// Look up a token without consuming it. Expired tokens are reported as
    /// absent.
    async fn peek(
        &self,
        key: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<RegistrationTokenRecord>, StoreError>;

    /// Atomically look up and delete a token. Under concurrent calls with
    /// the same key, at most one caller receives the record. Expired tokens
    /// are deleted and reported as absent.
    async fn consume(
        &self,
        key: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<RegistrationTokenRecord>, StoreError>;
}
