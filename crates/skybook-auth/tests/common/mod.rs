//! A software authenticator and service fixtures for end-to-end flow tests.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ciborium::Value;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use sha2::{Digest, Sha256};
use skybook_auth::AuthService;
use skybook_core::RelyingParty;
use skybook_passkey::authenticator::{FLAG_ATTESTED_CREDENTIAL_DATA, FLAG_USER_PRESENT};
use skybook_passkey::cose::encode_p256;
use skybook_passkey::response::{AssertionPayload, AttestationPayload};
use skybook_passkey::{AuthenticationResponse, RegistrationResponse};
use skybook_session::{SessionIssuer, SessionKeys};
use skybook_store::MemoryStore;
use std::sync::Arc;
use std::time::Duration;

pub const SECRET: &str = "an-adequately-long-session-secret!!!";
pub const RP_ID: &str = "booking.example.com";
pub const ORIGIN: &str = "https://booking.example.com";

pub fn relying_party() -> RelyingParty {
    RelyingParty {
        name: "Skybook".to_string(),
        id: RP_ID.to_string(),
        origin: ORIGIN.to_string(),
    }
}

/// A service wired to a fresh in-memory store.
pub fn service() -> AuthService {
    let store = Arc::new(MemoryStore::new());
    let issuer = SessionIssuer::new(
        SessionKeys::derive(SECRET).unwrap(),
        Duration::from_secs(3600),
    )
    .unwrap();
    AuthService::new(
        store.clone(),
        store,
        issuer,
        relying_party(),
        Duration::from_secs(900),
    )
    .unwrap()
}

/// A deterministic software P-256 authenticator.
pub struct SoftAuthenticator {
    key: SigningKey,
    pub credential_id: Vec<u8>,
}

impl SoftAuthenticator {
    pub fn new() -> Self {
        Self::with_seed(11)
    }

    pub fn with_seed(seed: u8) -> Self {
        Self {
            key: SigningKey::from_slice(&[seed; 32]).unwrap(),
            credential_id: vec![seed; 16],
        }
    }

    fn client_data(ceremony: &str, challenge: &str) -> Vec<u8> {
        serde_json::json!({ "type": ceremony, "challenge": challenge, "origin": ORIGIN })
            .to_string()
            .into_bytes()
    }

    fn auth_data(&self, counter: u32, attested: bool) -> Vec<u8> {
        let mut out: Vec<u8> = Sha256::digest(RP_ID.as_bytes()).to_vec();
        let mut flags = FLAG_USER_PRESENT;
        if attested {
            flags |= FLAG_ATTESTED_CREDENTIAL_DATA;
        }
        out.push(flags);
        out.extend(counter.to_be_bytes());
        if attested {
            out.extend([0u8; 16]);
            out.extend((self.credential_id.len() as u16).to_be_bytes());
            out.extend(&self.credential_id);
            out.extend(encode_p256(self.key.verifying_key()));
        }
        out
    }

    /// Answer a registration ceremony (`none` attestation).
    pub fn attest(&self, challenge: &str) -> RegistrationResponse {
        let client_data = Self::client_data("webauthn.create", challenge);
        let object = Value::Map(vec![
            (Value::Text("fmt".into()), Value::Text("none".into())),
            (Value::Text("attStmt".into()), Value::Map(Vec::new())),
            (
                Value::Text("authData".into()),
                Value::Bytes(self.auth_data(0, true)),
            ),
        ]);
        let mut object_bytes = Vec::new();
        ciborium::ser::into_writer(&object, &mut object_bytes).unwrap();

        RegistrationResponse {
            id: URL_SAFE_NO_PAD.encode(&self.credential_id),
            raw_id: URL_SAFE_NO_PAD.encode(&self.credential_id),
            ty: "public-key".to_string(),
            response: AttestationPayload {
                client_data_json: URL_SAFE_NO_PAD.encode(&client_data),
                attestation_object: URL_SAFE_NO_PAD.encode(&object_bytes),
            },
        }
    }

    /// Answer an authentication ceremony with the given signature counter.
    pub fn assert(&self, challenge: &str, counter: u32) -> AuthenticationResponse {
        let client_data = Self::client_data("webauthn.get", challenge);
        let auth_data = self.auth_data(counter, false);

        let mut message = auth_data.clone();
        message.extend(Sha256::digest(&client_data));
        let signature: Signature = self.key.sign(&message);

        AuthenticationResponse {
            id: URL_SAFE_NO_PAD.encode(&self.credential_id),
            raw_id: URL_SAFE_NO_PAD.encode(&self.credential_id),
            ty: "public-key".to_string(),
            response: AssertionPayload {
                client_data_json: URL_SAFE_NO_PAD.encode(&client_data),
                authenticator_data: URL_SAFE_NO_PAD.encode(&auth_data),
                signature: URL_SAFE_NO_PAD.encode(signature.to_der().as_bytes()),
                user_handle: None,
            },
        }
    }
}
