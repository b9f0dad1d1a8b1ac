//! In-memory storage backend.
//!
//! State lives in process memory and disappears on restart. Used for tests
//! and for running without a configured database.

use crate::error::StoreError;
use crate::store::{RegistrationTokenStore, UserStore};
use crate::token::RegistrationTokenRecord;
use crate::user::{DeviceCredential, PendingChallenge, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skybook_core::{Identity, Role};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use uuid::Uuid;

/// Process-local store backed by `RwLock`-guarded maps.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    tokens: RwLock<HashMap<Uuid, RegistrationTokenRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err<T>(e: std::sync::PoisonError<T>) -> StoreError {
        StoreError::LockPoisoned(e.to_string())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find(&self, identity: &Identity) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().map_err(Self::lock_err)?;
        Ok(users.get(&identity.to_hex()).cloned())
    }

    async fn put_challenge(
        &self,
        identity: &Identity,
        challenge: PendingChallenge,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(Self::lock_err)?;
        let record = users
            .entry(identity.to_hex())
            .or_insert_with(|| UserRecord::new(*identity, challenge.issued_at));
        record.current_challenge = Some(challenge);
        Ok(())
    }

    async fn take_challenge(
        &self,
        identity: &Identity,
    ) -> Result<Option<PendingChallenge>, StoreError> {
        let mut users = self.users.write().map_err(Self::lock_err)?;
        Ok(users
            .get_mut(&identity.to_hex())
            .and_then(|record| record.current_challenge.take()))
    }

    async fn attach_device(
        &self,
        identity: &Identity,
        device: DeviceCredential,
        deletable: bool,
        roles: BTreeSet<Role>,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(Self::lock_err)?;
        let record = users
            .get_mut(&identity.to_hex())
            .ok_or(StoreError::UserNotFound)?;
        if record.device.is_some() {
            return Err(StoreError::DeviceAlreadyAttached);
        }
        record.device = Some(device);
        record.deletable = deletable;
        record.roles = roles;
        Ok(())
    }

    async fn advance_counter(&self, identity: &Identity, counter: u32) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(Self::lock_err)?;
        let record = users
            .get_mut(&identity.to_hex())
            .ok_or(StoreError::UserNotFound)?;
        let device = record.device.as_mut().ok_or(StoreError::UserNotFound)?;
        device.counter = counter;
        Ok(())
    }

    async fn set_roles(
        &self,
        identity: &Identity,
        roles: BTreeSet<Role>,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(Self::lock_err)?;
        let record = users
            .get_mut(&identity.to_hex())
            .ok_or(StoreError::UserNotFound)?;
        record.roles = roles;
        Ok(())
    }

    async fn any_registered(&self) -> Result<bool, StoreError> {
        let users = self.users.read().map_err(Self::lock_err)?;
        Ok(users.values().any(|record| record.device.is_some()))
    }
}

#[async_trait]
impl RegistrationTokenStore for MemoryStore {
    async fn insert(&self, record: RegistrationTokenRecord) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write().map_err(Self::lock_err)?;
        tokens.insert(record.key, record);
        Ok(())
    }

    async fn peek(
        &self,
        key: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<RegistrationTokenRecord>, StoreError> {
        let tokens = self.tokens.read().map_err(Self::lock_err)?;
        Ok(tokens
            .get(key)
            .filter(|record| !record.is_expired(now))
            .cloned())
    }

    async fn consume(
        &self,
        key: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<RegistrationTokenRecord>, StoreError> {
        let mut tokens = self.tokens.write().map_err(Self::lock_err)?;
        Ok(tokens
            .remove(key)
            .filter(|record| !record.is_expired(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::from_email("alice@example.com")
    }

    fn challenge(value: &str) -> PendingChallenge {
        PendingChallenge {
            value: value.to_string(),
            issued_at: Utc::now(),
        }
    }

    fn device() -> DeviceCredential {
        DeviceCredential {
            credential_id: vec![1, 2, 3],
            public_key: vec![4, 5, 6],
            counter: 0,
        }
    }

    #[tokio::test]
    async fn test_put_challenge_creates_user() {
        let store = MemoryStore::new();
        let id = identity();
        store.put_challenge(&id, challenge("c1")).await.unwrap();

        let record = store.find(&id).await.unwrap().unwrap();
        assert_eq!(record.current_challenge.as_ref().unwrap().value, "c1");
        assert!(!record.is_registered());
    }

    #[tokio::test]
    async fn test_newer_challenge_replaces_older() {
        let store = MemoryStore::new();
        let id = identity();
        store.put_challenge(&id, challenge("c1")).await.unwrap();
        store.put_challenge(&id, challenge("c2")).await.unwrap();

        let taken = store.take_challenge(&id).await.unwrap().unwrap();
        assert_eq!(taken.value, "c2");
    }

    #[tokio::test]
    async fn test_take_challenge_clears() {
        let store = MemoryStore::new();
        let id = identity();
        store.put_challenge(&id, challenge("c1")).await.unwrap();

        assert!(store.take_challenge(&id).await.unwrap().is_some());
        assert!(store.take_challenge(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attach_device_once() {
        let store = MemoryStore::new();
        let id = identity();
        store.put_challenge(&id, challenge("c1")).await.unwrap();

        let roles = BTreeSet::from([Role::Admin]);
        store
            .attach_device(&id, device(), false, roles.clone())
            .await
            .unwrap();

        let record = store.find(&id).await.unwrap().unwrap();
        assert!(record.is_registered());
        assert!(!record.deletable);
        assert_eq!(record.roles, roles);

        let err = store
            .attach_device(&id, device(), true, BTreeSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DeviceAlreadyAttached));
    }

    #[tokio::test]
    async fn test_attach_device_requires_user() {
        let store = MemoryStore::new();
        let err = store
            .attach_device(&identity(), device(), true, BTreeSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound));
    }

    #[tokio::test]
    async fn test_advance_counter() {
        let store = MemoryStore::new();
        let id = identity();
        store.put_challenge(&id, challenge("c1")).await.unwrap();
        store
            .attach_device(&id, device(), true, BTreeSet::new())
            .await
            .unwrap();

        store.advance_counter(&id, 42).await.unwrap();
        let record = store.find(&id).await.unwrap().unwrap();
        assert_eq!(record.device.unwrap().counter, 42);
    }

    #[tokio::test]
    async fn test_any_registered_ignores_pending_users() {
        let store = MemoryStore::new();
        let id = identity();
        assert!(!store.any_registered().await.unwrap());

        store.put_challenge(&id, challenge("c1")).await.unwrap();
        assert!(!store.any_registered().await.unwrap());

        store
            .attach_device(&id, device(), true, BTreeSet::new())
            .await
            .unwrap();
        assert!(store.any_registered().await.unwrap());
    }

    #[tokio::test]
    async fn test_token_consume_is_single_use() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let record = RegistrationTokenRecord::new(now, chrono::Duration::minutes(15), true);
        let key = record.key;
        store.insert(record).await.unwrap();

        assert!(store.peek(&key, now).await.unwrap().is_some());
        assert!(store.peek(&key, now).await.unwrap().is_some());
        assert!(store.consume(&key, now).await.unwrap().is_some());
        assert!(store.consume(&key, now).await.unwrap().is_none());
        assert!(store.peek(&key, now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_absent() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let record = RegistrationTokenRecord::new(now, chrono::Duration::minutes(15), true);
        let key = record.key;
        store.insert(record).await.unwrap();

        let later = now + chrono::Duration::minutes(16);
        assert!(store.peek(&key, later).await.unwrap().is_none());
        assert!(store.consume(&key, later).await.unwrap().is_none());
    }
}
