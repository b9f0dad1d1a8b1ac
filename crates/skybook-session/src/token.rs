//! Session token creation and verification.

use crate::claims::SessionClaims;
use crate::error::SessionError;
use crate::keys::SessionKeys;
use biscuit_auth::builder::AuthorizerBuilder;
use biscuit_auth::macros::fact;
use biscuit_auth::{Biscuit, PublicKey};
use chrono::{DateTime, Utc};
use skybook_core::Role;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Issues session tokens with a fixed lifetime.
pub struct SessionIssuer {
    keys: SessionKeys,
    lifetime: chrono::Duration,
}

impl SessionIssuer {
    pub fn new(keys: SessionKeys, lifetime: std::time::Duration) -> Result<Self, SessionError> {
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|e| SessionError::InvalidLifetime(e.to_string()))?;
        Ok(Self { keys, lifetime })
    }

    /// Mint a token for a freshly authenticated user.
    pub fn issue(
        &self,
        email: &str,
        roles: &BTreeSet<Role>,
    ) -> Result<(String, SessionClaims), SessionError> {
        self.issue_at(Utc::now(), email, roles)
    }

    fn issue_at(
        &self,
        now: DateTime<Utc>,
        email: &str,
        roles: &BTreeSet<Role>,
    ) -> Result<(String, SessionClaims), SessionError> {
        // Facts carry whole seconds; keep the claims consistent with what a
        // verifier will read back.
        let issued_at = now.timestamp();
        let expires_at = (now + self.lifetime).timestamp();

        let mut builder = Biscuit::builder();
        builder = builder
            .fact(fact!("email({email})", email = email.to_string()))
            .map_err(|e| SessionError::TokenCreationFailed(e.to_string()))?;
        for role in roles {
            builder = builder
                .fact(fact!("role({role})", role = role.as_str().to_string()))
                .map_err(|e| SessionError::TokenCreationFailed(e.to_string()))?;
        }
        builder = builder
            .fact(fact!("issued_at({ts})", ts = issued_at))
            .map_err(|e| SessionError::TokenCreationFailed(e.to_string()))?
            .fact(fact!("expires_at({ts})", ts = expires_at))
            .map_err(|e| SessionError::TokenCreationFailed(e.to_string()))?;

        let biscuit = builder
            .build(self.keys.inner())
            .map_err(|e| SessionError::TokenCreationFailed(e.to_string()))?;
        let token = biscuit
            .to_base64()
            .map_err(|e| SessionError::TokenCreationFailed(e.to_string()))?;

        let claims = SessionClaims {
            email: email.to_string(),
            roles: roles.clone(),
            issued_at: timestamp(issued_at)?,
            expires_at: timestamp(expires_at)?,
        };
        Ok((token, claims))
    }
}

/// Verifies session tokens and extracts their claims.
pub struct SessionVerifier {
    public_key: PublicKey,
}

impl SessionVerifier {
    pub fn new(public_key: PublicKey) -> Self {
        Self { public_key }
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against an explicit `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        let biscuit = Biscuit::from_base64(token, self.public_key.clone())
            .map_err(|e| SessionError::TokenParseFailed(e.to_string()))?;

        let mut authorizer = AuthorizerBuilder::new()
            .code(format!("time({now});\nallow if true;", now = now.timestamp()))
            .map_err(|e| SessionError::VerificationFailed(e.to_string()))?
            .build(&biscuit)
            .map_err(|e| SessionError::VerificationFailed(e.to_string()))?;
        authorizer
            .authorize()
            .map_err(|e| SessionError::VerificationFailed(e.to_string()))?;

        let email = query_strings(&mut authorizer, "email")?
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::MissingClaim {
                claim: "email".to_string(),
            })?;

        let mut roles = BTreeSet::new();
        for name in query_strings(&mut authorizer, "role")? {
            let role = Role::from_str(&name)
                .map_err(|e| SessionError::VerificationFailed(e.to_string()))?;
            roles.insert(role);
        }

        let claims = SessionClaims {
            email,
            roles,
            issued_at: timestamp(query_instant(&mut authorizer, "issued_at")?)?,
            expires_at: timestamp(query_instant(&mut authorizer, "expires_at")?)?,
        };

        if claims.is_expired(now) {
            return Err(SessionError::TokenExpired);
        }
        Ok(claims)
    }
}

fn query_strings(
    authorizer: &mut biscuit_auth::Authorizer,
    name: &str,
) -> Result<Vec<String>, SessionError> {
    let rule: biscuit_auth::builder::Rule = format!("data($x) <- {name}($x)")
        .parse()
        .map_err(|e: biscuit_auth::error::Token| SessionError::VerificationFailed(e.to_string()))?;
    let results: Vec<(String,)> = authorizer
        .query(rule)
        .map_err(|e| SessionError::VerificationFailed(e.to_string()))?;
    Ok(results.into_iter().map(|(s,)| s).collect())
}

fn query_instant(
    authorizer: &mut biscuit_auth::Authorizer,
    name: &str,
) -> Result<i64, SessionError> {
    let rule: biscuit_auth::builder::Rule = format!("data($t) <- {name}($t)")
        .parse()
        .map_err(|e: biscuit_auth::error::Token| SessionError::VerificationFailed(e.to_string()))?;
    let results: Vec<(i64,)> = authorizer
        .query(rule)
        .map_err(|e| SessionError::VerificationFailed(e.to_string()))?;
    results
        .into_iter()
        .next()
        .map(|(t,)| t)
        .ok_or_else(|| SessionError::MissingClaim {
            claim: name.to_string(),
        })
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, SessionError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| SessionError::VerificationFailed(format!("timestamp {seconds} out of range")))
}
