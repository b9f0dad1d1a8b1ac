//! SQLite storage backend.
//!
//! All timestamps are stored as RFC 3339 text and role sets as JSON arrays,
//! so the rows stay readable with plain `sqlite3`. Challenge take runs
//! inside a transaction and token consume is a single `DELETE .. RETURNING`,
//! so both stay exactly-once even across processes.

use crate::error::StoreError;
use crate::store::{RegistrationTokenStore, UserStore};
use crate::token::RegistrationTokenRecord;
use crate::user::{DeviceCredential, PendingChallenge, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skybook_core::{Identity, Role};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::collections::BTreeSet;
use std::str::FromStr;
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    identity            TEXT PRIMARY KEY,
    created_at          TEXT NOT NULL,
    deletable           INTEGER NOT NULL,
    roles               TEXT NOT NULL,
    challenge_value     TEXT,
    challenge_issued_at TEXT,
    credential_id       BLOB,
    public_key          BLOB,
    counter             INTEGER
);

CREATE TABLE IF NOT EXISTS registration_tokens (
    token_key         TEXT PRIMARY KEY,
    created_at        TEXT NOT NULL,
    expires_at        TEXT NOT NULL,
    user_is_deletable INTEGER NOT NULL
);
"#;

/// Durable store backed by SQLite via sqlx.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if necessary) the database at `url` and apply the
    /// schema. A single connection keeps SQLite's one-writer model trivial
    /// and makes `sqlite::memory:` databases usable.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }
}

fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("{field}: {e}")))
}

fn parse_roles(raw: &str) -> Result<BTreeSet<Role>, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Corrupt(format!("roles: {e}")))
}

fn roles_json(roles: &BTreeSet<Role>) -> Result<String, StoreError> {
    serde_json::to_string(roles).map_err(|e| StoreError::Corrupt(format!("roles: {e}")))
}

fn row_to_user(row: &SqliteRow) -> Result<UserRecord, StoreError> {
    let identity_hex: String = row.try_get("identity")?;
    let identity = Identity::from_hex(&identity_hex)
        .map_err(|e| StoreError::Corrupt(format!("identity: {e}")))?;

    let created_at: String = row.try_get("created_at")?;
    let roles: String = row.try_get("roles")?;

    let current_challenge = match row.try_get::<Option<String>, _>("challenge_value")? {
        Some(value) => {
            let issued_at: Option<String> = row.try_get("challenge_issued_at")?;
            let issued_at = issued_at
                .ok_or_else(|| StoreError::Corrupt("challenge without issue time".into()))?;
            Some(PendingChallenge {
                value,
                issued_at: parse_timestamp("challenge_issued_at", &issued_at)?,
            })
        }
        None => None,
    };

    let device = match row.try_get::<Option<Vec<u8>>, _>("credential_id")? {
        Some(credential_id) => {
            let public_key: Option<Vec<u8>> = row.try_get("public_key")?;
            let counter: Option<i64> = row.try_get("counter")?;
            let counter = counter
                .ok_or_else(|| StoreError::Corrupt("credential without counter".into()))?;
            Some(DeviceCredential {
                credential_id,
                public_key: public_key
                    .ok_or_else(|| StoreError::Corrupt("credential without public key".into()))?,
                counter: u32::try_from(counter)
                    .map_err(|_| StoreError::Corrupt(format!("counter out of range: {counter}")))?,
            })
        }
        None => None,
    };

    Ok(UserRecord {
        identity,
        created_at: parse_timestamp("created_at", &created_at)?,
        deletable: row.try_get::<i64, _>("deletable")? != 0,
        roles: parse_roles(&roles)?,
        current_challenge,
        device,
    })
}

fn row_to_token(row: &SqliteRow) -> Result<RegistrationTokenRecord, StoreError> {
    let key: String = row.try_get("token_key")?;
    let created_at: String = row.try_get("created_at")?;
    let expires_at: String = row.try_get("expires_at")?;
    Ok(RegistrationTokenRecord {
        key: Uuid::parse_str(&key).map_err(|e| StoreError::Corrupt(format!("token_key: {e}")))?,
        created_at: parse_timestamp("created_at", &created_at)?,
        expires_at: parse_timestamp("expires_at", &expires_at)?,
        user_is_deletable: row.try_get::<i64, _>("user_is_deletable")? != 0,
    })
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn find(&self, identity: &Identity) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE identity = ?")
            .bind(identity.to_hex())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn put_challenge(
        &self,
        identity: &Identity,
        challenge: PendingChallenge,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (identity, created_at, deletable, roles, challenge_value, challenge_issued_at) \
             VALUES (?, ?, 1, '[]', ?, ?) \
             ON CONFLICT(identity) DO UPDATE SET \
                 challenge_value = excluded.challenge_value, \
                 challenge_issued_at = excluded.challenge_issued_at",
        )
        .bind(identity.to_hex())
        .bind(challenge.issued_at.to_rfc3339())
        .bind(&challenge.value)
        .bind(challenge.issued_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn take_challenge(
        &self,
        identity: &Identity,
    ) -> Result<Option<PendingChallenge>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT challenge_value, challenge_issued_at FROM users WHERE identity = ?",
        )
        .bind(identity.to_hex())
        .fetch_optional(&mut *tx)
        .await?;

        let pending = match row {
            Some(row) => match row.try_get::<Option<String>, _>("challenge_value")? {
                Some(value) => {
                    let issued_at: Option<String> = row.try_get("challenge_issued_at")?;
                    let issued_at = issued_at.ok_or_else(|| {
                        StoreError::Corrupt("challenge without issue time".into())
                    })?;
                    Some(PendingChallenge {
                        value,
                        issued_at: parse_timestamp("challenge_issued_at", &issued_at)?,
                    })
                }
                None => None,
            },
            None => None,
        };

        sqlx::query(
            "UPDATE users SET challenge_value = NULL, challenge_issued_at = NULL \
             WHERE identity = ?",
        )
        .bind(identity.to_hex())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(pending)
    }

    async fn attach_device(
        &self,
        identity: &Identity,
        device: DeviceCredential,
        deletable: bool,
        roles: BTreeSet<Role>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT credential_id FROM users WHERE identity = ?")
            .bind(identity.to_hex())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::UserNotFound)?;
        if row.try_get::<Option<Vec<u8>>, _>("credential_id")?.is_some() {
            return Err(StoreError::DeviceAlreadyAttached);
        }

        sqlx::query(
            "UPDATE users SET credential_id = ?, public_key = ?, counter = ?, \
             deletable = ?, roles = ? WHERE identity = ?",
        )
        .bind(&device.credential_id)
        .bind(&device.public_key)
        .bind(device.counter as i64)
        .bind(deletable as i64)
        .bind(roles_json(&roles)?)
        .bind(identity.to_hex())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn advance_counter(&self, identity: &Identity, counter: u32) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET counter = ? WHERE identity = ? AND credential_id IS NOT NULL",
        )
        .bind(counter as i64)
        .bind(identity.to_hex())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound);
        }
        Ok(())
    }

    async fn set_roles(
        &self,
        identity: &Identity,
        roles: BTreeSet<Role>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET roles = ? WHERE identity = ?")
            .bind(roles_json(&roles)?)
            .bind(identity.to_hex())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound);
        }
        Ok(())
    }

    async fn any_registered(&self) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM users WHERE credential_id IS NOT NULL LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl RegistrationTokenStore for SqliteStore {
    async fn insert(&self, record: RegistrationTokenRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO registration_tokens (token_key, created_at, expires_at, user_is_deletable) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(record.key.to_string())
        .bind(record.created_at.to_rfc3339())
        .bind(record.expires_at.to_rfc3339())
        .bind(record.user_is_deletable as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn peek(
        &self,
        key: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<RegistrationTokenRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM registration_tokens WHERE token_key = ?")
            .bind(key.to_string())
            .fetch_optional(&self.pool)
            .await?;
        let record = row.as_ref().map(row_to_token).transpose()?;
        Ok(record.filter(|record| !record.is_expired(now)))
    }

    async fn consume(
        &self,
        key: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<RegistrationTokenRecord>, StoreError> {
        // Single-statement check-and-delete; a concurrent consumer deletes
        // zero rows and sees None.
        let row = sqlx::query("DELETE FROM registration_tokens WHERE token_key = ? RETURNING *")
            .bind(key.to_string())
            .fetch_optional(&self.pool)
            .await?;
        let record = row.as_ref().map(row_to_token).transpose()?;
        Ok(record.filter(|record| !record.is_expired(now)))
    }
}
