//! Ceremony option builders.
//!
//! These are the JSON structures handed to `navigator.credentials.create()`
//! and `.get()` in the browser, so serialization follows the WebAuthn
//! camelCase convention.

use crate::cose::{ALG_EDDSA, ALG_ES256};
use crate::response::encode_b64url;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use skybook_core::{Identity, RelyingParty};

/// Ceremony timeout advertised to the client, in milliseconds.
pub const CEREMONY_TIMEOUT_MS: u32 = 60_000;

/// Generate a fresh random challenge (base64url of 32 random bytes).
pub fn generate_challenge() -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    encode_b64url(&bytes)
}

/// Options for a registration ceremony.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOptions {
    pub challenge: String,
    pub rp: RelyingPartyEntity,
    pub user: UserEntity,
    pub pub_key_cred_params: Vec<CredentialParameters>,
    pub timeout: u32,
    pub attestation: String,
    pub authenticator_selection: AuthenticatorSelection,
    pub exclude_credentials: Vec<CredentialDescriptor>,
}

/// Options for an authentication ceremony.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationOptions {
    pub challenge: String,
    pub timeout: u32,
    pub rp_id: String,
    pub allow_credentials: Vec<CredentialDescriptor>,
    pub user_verification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelyingPartyEntity {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    /// Opaque per-identity user handle (base64url).
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialParameters {
    #[serde(rename = "type")]
    pub ty: String,
    pub alg: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialDescriptor {
    #[serde(rename = "type")]
    pub ty: String,
    /// Credential id, base64url.
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    pub user_verification: String,
    pub require_resident_key: bool,
}

impl RegistrationOptions {
    /// Build options for registering the first device of `identity`.
    ///
    /// The exclusion list is empty: a user registers exactly one device, and
    /// a second registration attempt is refused before options are built.
    pub fn new(rp: &RelyingParty, identity: &Identity, email: &str, challenge: String) -> Self {
        Self {
            challenge,
            rp: RelyingPartyEntity {
                name: rp.name.clone(),
                id: rp.id.clone(),
            },
            user: UserEntity {
                id: encode_b64url(identity.as_bytes()),
                name: email.to_string(),
                display_name: email.to_string(),
            },
            pub_key_cred_params: vec![
                CredentialParameters {
                    ty: "public-key".to_string(),
                    alg: ALG_ES256,
                },
                CredentialParameters {
                    ty: "public-key".to_string(),
                    alg: ALG_EDDSA,
                },
            ],
            timeout: CEREMONY_TIMEOUT_MS,
            attestation: "indirect".to_string(),
            authenticator_selection: AuthenticatorSelection {
                user_verification: "preferred".to_string(),
                require_resident_key: false,
            },
            exclude_credentials: Vec::new(),
        }
    }
}

impl AuthenticationOptions {
    /// Build options that allow exactly the stored credential.
    pub fn new(rp_id: &str, credential_id: &[u8], challenge: String) -> Self {
        Self {
            challenge,
            timeout: CEREMONY_TIMEOUT_MS,
            rp_id: rp_id.to_string(),
            allow_credentials: vec![CredentialDescriptor {
                ty: "public-key".to_string(),
                id: encode_b64url(credential_id),
            }],
            user_verification: "preferred".to_string(),
        }
    }
}
