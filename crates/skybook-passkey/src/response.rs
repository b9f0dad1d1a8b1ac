//! Wire types for ceremony responses as the browser API produces them.
//!
//! Field names follow the WebAuthn JSON convention (camelCase, with the
//! `clientDataJSON` oddity); binary fields are base64url without padding.

use crate::error::PasskeyError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

/// Response to a registration (attestation) ceremony.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub response: AttestationPayload,
}

/// The authenticator output carried inside a [`RegistrationResponse`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationPayload {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub attestation_object: String,
}

/// Response to an authentication (assertion) ceremony.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub response: AssertionPayload,
}

/// The authenticator output carried inside an [`AuthenticationResponse`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionPayload {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
    #[serde(default)]
    pub user_handle: Option<String>,
}

/// The JSON the client signs over, after base64url decoding.
#[derive(Debug, Deserialize)]
pub struct CollectedClientData {
    #[serde(rename = "type")]
    pub ty: String,
    pub challenge: String,
    pub origin: String,
}

pub(crate) fn decode_b64url(field: &str, value: &str) -> Result<Vec<u8>, PasskeyError> {
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| PasskeyError::malformed(format!("{field} is not valid base64url: {e}")))
}

pub(crate) fn encode_b64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode and check the collected client data against the expected ceremony
/// parameters. Returns the raw JSON bytes (the signature base includes their
/// hash, so the exact bytes matter).
pub(crate) fn verify_client_data(
    raw: &str,
    expected_type: &str,
    expected_challenge: &str,
    expected_origin: &str,
) -> Result<Vec<u8>, PasskeyError> {
    let bytes = decode_b64url("clientDataJSON", raw)?;
    let data: CollectedClientData = serde_json::from_slice(&bytes)
        .map_err(|e| PasskeyError::malformed(format!("clientDataJSON: {e}")))?;

    if data.ty != expected_type {
        return Err(PasskeyError::ceremony(format!(
            "unexpected client data type {:?}",
            data.ty
        )));
    }
    if data.challenge != expected_challenge {
        return Err(PasskeyError::ChallengeMismatch);
    }
    // Byte-for-byte comparison; a trailing slash is a different origin.
    if data.origin != expected_origin {
        return Err(PasskeyError::ceremony(format!(
            "origin {:?} does not match the relying party",
            data.origin
        )));
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_data(ty: &str, challenge: &str, origin: &str) -> String {
        encode_b64url(
            serde_json::json!({ "type": ty, "challenge": challenge, "origin": origin })
                .to_string()
                .as_bytes(),
        )
    }

    #[test]
    fn test_client_data_accepted() {
        let raw = client_data("webauthn.get", "abc", "https://example.com");
        let bytes =
            verify_client_data(&raw, "webauthn.get", "abc", "https://example.com").unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_challenge_mismatch_detected() {
        let raw = client_data("webauthn.get", "abc", "https://example.com");
        let err =
            verify_client_data(&raw, "webauthn.get", "other", "https://example.com").unwrap_err();
        assert!(matches!(err, PasskeyError::ChallengeMismatch));
    }

    #[test]
    fn test_origin_mismatch_detected() {
        let raw = client_data("webauthn.get", "abc", "https://evil.example.com");
        let err =
            verify_client_data(&raw, "webauthn.get", "abc", "https://example.com").unwrap_err();
        assert!(matches!(err, PasskeyError::CeremonyFailed(_)));
    }

    #[test]
    fn test_wrong_ceremony_type_detected() {
        let raw = client_data("webauthn.create", "abc", "https://example.com");
        let err =
            verify_client_data(&raw, "webauthn.get", "abc", "https://example.com").unwrap_err();
        assert!(matches!(err, PasskeyError::CeremonyFailed(_)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = verify_client_data("%%%", "webauthn.get", "abc", "o").unwrap_err();
        assert!(matches!(err, PasskeyError::Malformed(_)));
    }

    #[test]
    fn test_registration_response_deserializes_browser_shape() {
        let json = serde_json::json!({
            "id": "AQID",
            "rawId": "AQID",
            "type": "public-key",
            "response": {
                "clientDataJSON": "e30",
                "attestationObject": "oA"
            }
        });
        let parsed: RegistrationResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.raw_id, "AQID");
        assert_eq!(parsed.response.attestation_object, "oA");
    }
}
