//! The authentication service.
//!
//! Orchestrates the full ceremony flows on top of the store, passkey, and
//! session layers. Ordering inside the finish operations is deliberate:
//! the challenge is taken (and therefore gone) before verification runs,
//! the registration token is consumed only after the attestation verifies,
//! and the signature counter is persisted before a session is issued.

use crate::challenge::ChallengeManager;
use crate::error::AuthError;
use crate::tokens::RegistrationTokenService;
use chrono::Utc;
use skybook_core::{Identity, RelyingParty, Role};
use skybook_passkey::{
    AuthenticationOptions, AuthenticationResponse, RegistrationOptions, RegistrationResponse,
    verify_authentication, verify_registration,
};
use skybook_session::{SessionClaims, SessionIssuer};
use skybook_store::{DeviceCredential, RegistrationTokenRecord, RegistrationTokenStore, UserStore};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// A freshly minted session: the serialized token plus its claims.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub token: String,
    pub claims: SessionClaims,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    challenges: ChallengeManager,
    tokens: RegistrationTokenService,
    sessions: SessionIssuer,
    rp: RelyingParty,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        token_store: Arc<dyn RegistrationTokenStore>,
        sessions: SessionIssuer,
        rp: RelyingParty,
        registration_token_lifetime: std::time::Duration,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            challenges: ChallengeManager::new(users.clone()),
            tokens: RegistrationTokenService::new(token_store, registration_token_lifetime)?,
            users,
            sessions,
            rp,
        })
    }

    pub fn registration_token_lifetime(&self) -> chrono::Duration {
        self.tokens.lifetime()
    }

    /// First-boot hook: if no user has ever completed registration, mint a
    /// registration token for the initial administrator and surface it in
    /// the logs.
    pub async fn bootstrap(&self) -> Result<Option<RegistrationTokenRecord>, AuthError> {
        if self.users.any_registered().await? {
            return Ok(None);
        }
        let record = self.tokens.issue(false).await?;
        tracing::warn!(
            token = %record.key,
            expires_at = %record.expires_at,
            "no registered users; use this token to register the initial administrator"
        );
        Ok(Some(record))
    }

    /// Mint a registration token for an ordinary (deletable) account.
    pub async fn issue_registration_token(&self) -> Result<RegistrationTokenRecord, AuthError> {
        self.tokens.issue(true).await
    }

    /// Start a registration ceremony. The token is checked but not
    /// consumed; it stays valid until the ceremony completes.
    pub async fn begin_registration(
        &self,
        email: &str,
        token: &Uuid,
    ) -> Result<RegistrationOptions, AuthError> {
        self.tokens.check(token).await?;

        let identity = Identity::from_email(email);
        if let Some(user) = self.users.find(&identity).await?
            && user.is_registered()
        {
            return Err(AuthError::AlreadyRegistered);
        }

        let challenge = self.challenges.issue(&identity).await?;
        tracing::debug!(identity = %identity, "registration ceremony started");
        Ok(RegistrationOptions::new(&self.rp, &identity, email, challenge))
    }

    /// Complete a registration ceremony and issue the first session.
    pub async fn finish_registration(
        &self,
        email: &str,
        token: &Uuid,
        response: &RegistrationResponse,
    ) -> Result<SessionHandle, AuthError> {
        // Cheap reject before any state is disturbed.
        self.tokens.check(token).await?;

        let identity = Identity::from_email(email);
        if let Some(user) = self.users.find(&identity).await?
            && user.is_registered()
        {
            return Err(AuthError::AlreadyRegistered);
        }

        // The challenge is gone from here on, pass or fail.
        let challenge = self.challenges.take(&identity, Utc::now()).await?;
        let credential =
            verify_registration(response, &challenge, &self.rp.origin, &self.rp.id)?;

        // Atomic: under a race on the same token, one caller registers and
        // the rest see TokenNotFound.
        let consumed = self.tokens.consume(token).await?;

        let deletable = consumed.user_is_deletable;
        let roles: BTreeSet<Role> = if deletable {
            BTreeSet::new()
        } else {
            BTreeSet::from([Role::Admin])
        };
        self.users
            .attach_device(
                &identity,
                DeviceCredential {
                    credential_id: credential.credential_id,
                    public_key: credential.public_key,
                    counter: credential.counter,
                },
                deletable,
                roles.clone(),
            )
            .await?;

        tracing::info!(identity = %identity, deletable, "registration completed");
        let (token, claims) = self.sessions.issue(email, &roles)?;
        Ok(SessionHandle { token, claims })
    }

    /// Start an authentication ceremony.
    pub async fn begin_authentication(
        &self,
        email: &str,
    ) -> Result<AuthenticationOptions, AuthError> {
        let identity = Identity::from_email(email);
        let user = self
            .users
            .find(&identity)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let device = user.device.as_ref().ok_or(AuthError::NotRegistered)?;

        let challenge = self.challenges.issue(&identity).await?;
        tracing::debug!(identity = %identity, "authentication ceremony started");
        Ok(AuthenticationOptions::new(
            &self.rp.id,
            &device.credential_id,
            challenge,
        ))
    }

    /// Complete an authentication ceremony and issue a session.
    pub async fn finish_authentication(
        &self,
        email: &str,
        response: &AuthenticationResponse,
    ) -> Result<SessionHandle, AuthError> {
        let identity = Identity::from_email(email);
        let user = self
            .users
            .find(&identity)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let device = user.device.as_ref().ok_or(AuthError::NotRegistered)?;

        let challenge = self.challenges.take(&identity, Utc::now()).await?;
        let new_counter = verify_authentication(
            response,
            &challenge,
            &self.rp.origin,
            &self.rp.id,
            &device.public_key,
            device.counter,
        )?;

        // Persist the counter before handing out a token; a crash between
        // the two must not leave the old counter accepted again.
        self.users.advance_counter(&identity, new_counter).await?;

        tracing::info!(identity = %identity, counter = new_counter, "authentication completed");
        let (token, claims) = self.sessions.issue(email, &user.roles)?;
        Ok(SessionHandle { token, claims })
    }

    /// Apply role additions and removals; removal wins on overlap. A
    /// non-deletable account always keeps `admin`.
    pub async fn update_roles(
        &self,
        email: &str,
        add: &[Role],
        remove: &[Role],
    ) -> Result<BTreeSet<Role>, AuthError> {
        let identity = Identity::from_email(email);
        let user = self
            .users
            .find(&identity)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let mut roles = user.roles.clone();
        roles.extend(add.iter().copied());
        for role in remove {
            roles.remove(role);
        }
        if !user.deletable {
            roles.insert(Role::Admin);
        }

        self.users.set_roles(&identity, roles.clone()).await?;
        tracing::info!(identity = %identity, ?roles, "roles updated");
        Ok(roles)
    }
}
