//! A soft authenticator for exercising the verifiers with real bytes.

use crate::authenticator::{FLAG_ATTESTED_CREDENTIAL_DATA, FLAG_USER_PRESENT};
use crate::cose::encode_p256;
use crate::response::{
    AssertionPayload, AttestationPayload, AuthenticationResponse, RegistrationResponse,
    encode_b64url,
};
use ciborium::Value;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use sha2::{Digest, Sha256};

pub(crate) const RP_ID: &str = "booking.example.com";

pub(crate) struct SoftKey {
    key: SigningKey,
    pub credential_id: Vec<u8>,
}

impl SoftKey {
    pub fn new() -> Self {
        Self::with_seed(7)
    }

    pub fn with_seed(seed: u8) -> Self {
        Self {
            key: SigningKey::from_slice(&[seed; 32]).unwrap(),
            credential_id: vec![seed; 16],
        }
    }

    pub fn cose_key(&self) -> Vec<u8> {
        encode_p256(self.key.verifying_key())
    }

    fn client_data(ceremony: &str, challenge: &str, origin: &str) -> Vec<u8> {
        serde_json::json!({ "type": ceremony, "challenge": challenge, "origin": origin })
            .to_string()
            .into_bytes()
    }

    fn auth_data(&self, rp_id: &str, counter: u32, attested: bool) -> Vec<u8> {
        let mut out: Vec<u8> = Sha256::digest(rp_id.as_bytes()).to_vec();
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
            out.extend(self.cose_key());
        }
        out
    }

    fn attestation_with_fmt(
        &self,
        fmt: &str,
        att_stmt: Vec<(Value, Value)>,
        challenge: &str,
        origin: &str,
        rp_id: &str,
    ) -> RegistrationResponse {
        let client_data = Self::client_data("webauthn.create", challenge, origin);
        let object = Value::Map(vec![
            (Value::Text("fmt".into()), Value::Text(fmt.into())),
            (Value::Text("attStmt".into()), Value::Map(att_stmt)),
            (
                Value::Text("authData".into()),
                Value::Bytes(self.auth_data(rp_id, 0, true)),
            ),
        ]);
        let mut object_bytes = Vec::new();
        ciborium::ser::into_writer(&object, &mut object_bytes).unwrap();

        RegistrationResponse {
            id: encode_b64url(&self.credential_id),
            raw_id: encode_b64url(&self.credential_id),
            ty: "public-key".to_string(),
            response: AttestationPayload {
                client_data_json: encode_b64url(&client_data),
                attestation_object: encode_b64url(&object_bytes),
            },
        }
    }

    pub fn attestation(&self, challenge: &str, origin: &str, rp_id: &str) -> RegistrationResponse {
        self.attestation_with_fmt("none", Vec::new(), challenge, origin, rp_id)
    }

    pub fn packed_attestation(
        &self,
        challenge: &str,
        origin: &str,
        rp_id: &str,
    ) -> RegistrationResponse {
        let client_data = Self::client_data("webauthn.create", challenge, origin);
        let mut message = self.auth_data(rp_id, 0, true);
        message.extend(Sha256::digest(&client_data));
        let signature: Signature = self.key.sign(&message);

        self.attestation_with_fmt(
            "packed",
            vec![
                (Value::Text("alg".into()), Value::Integer((-7i64).into())),
                (
                    Value::Text("sig".into()),
                    Value::Bytes(signature.to_der().as_bytes().to_vec()),
                ),
            ],
            challenge,
            origin,
            rp_id,
        )
    }

    pub fn assertion(
        &self,
        challenge: &str,
        origin: &str,
        rp_id: &str,
        counter: u32,
    ) -> AuthenticationResponse {
        let client_data = Self::client_data("webauthn.get", challenge, origin);
        let auth_data = self.auth_data(rp_id, counter, false);

        let mut message = auth_data.clone();
        message.extend(Sha256::digest(&client_data));
        let signature: Signature = self.key.sign(&message);

        AuthenticationResponse {
            id: encode_b64url(&self.credential_id),
            raw_id: encode_b64url(&self.credential_id),
            ty: "public-key".to_string(),
            response: AssertionPayload {
                client_data_json: encode_b64url(&client_data),
                authenticator_data: encode_b64url(&auth_data),
                signature: encode_b64url(signature.to_der().as_bytes()),
                user_handle: None,
            },
        }
    }
}
