//! Attestation (registration) verification.

use crate::authenticator::AuthenticatorData;
use crate::cose::CoseKey;
use crate::error::PasskeyError;
use crate::response::{RegistrationResponse, decode_b64url, verify_client_data};
use ciborium::Value;
use sha2::{Digest, Sha256};

/// Credential material extracted from a successful registration.
///
/// The caller persists these and clears the pending challenge.
#[derive(Debug, Clone)]
pub struct RegisteredCredential {
    pub credential_id: Vec<u8>,
    /// COSE public key, raw CBOR bytes.
    pub public_key: Vec<u8>,
    /// Initial signature counter.
    pub counter: u32,
}

struct AttestationObject {
    fmt: String,
    att_stmt: Vec<(Value, Value)>,
    auth_data: Vec<u8>,
}

/// Verify a registration response against the expected ceremony parameters.
///
/// Checks, in order: client data (type, challenge, origin), relying-party id
/// hash, user presence, attested credential data, key algorithm support, and
/// the attestation statement (self-attestation only; certificate chains are
/// accepted as externally verified).
pub fn verify_registration(
    response: &RegistrationResponse,
    expected_challenge: &str,
    expected_origin: &str,
    expected_rp_id: &str,
) -> Result<RegisteredCredential, PasskeyError> {
    let client_data_bytes = verify_client_data(
        &response.response.client_data_json,
        "webauthn.create",
        expected_challenge,
        expected_origin,
    )?;

    let attestation = parse_attestation_object(&response.response.attestation_object)?;
    let auth_data = AuthenticatorData::parse(&attestation.auth_data)?;

    if !auth_data.rp_id_matches(expected_rp_id) {
        return Err(PasskeyError::ceremony("relying-party id hash mismatch"));
    }
    if !auth_data.user_present() {
        return Err(PasskeyError::ceremony("user presence not asserted"));
    }

    let attested = auth_data
        .attested_credential
        .ok_or_else(|| PasskeyError::malformed("response carries no attested credential"))?;

    // Reject unsupported algorithms before anything is persisted.
    let key = CoseKey::parse(&attested.public_key)?;

    let raw_id = decode_b64url("rawId", &response.raw_id)?;
    if raw_id != attested.credential_id {
        return Err(PasskeyError::ceremony(
            "rawId does not match the attested credential id",
        ));
    }

    verify_attestation_statement(
        &attestation,
        &key,
        &Sha256::digest(&client_data_bytes),
    )?;

    Ok(RegisteredCredential {
        credential_id: attested.credential_id,
        public_key: attested.public_key,
        counter: auth_data.counter,
    })
}

fn parse_attestation_object(raw: &str) -> Result<AttestationObject, PasskeyError> {
    let bytes = decode_b64url("attestationObject", raw)?;
    let value: Value = ciborium::de::from_reader(bytes.as_slice())
        .map_err(|e| PasskeyError::malformed(format!("attestationObject: {e}")))?;
    let Value::Map(entries) = value else {
        return Err(PasskeyError::malformed("attestationObject is not a map"));
    };

    let mut fmt = None;
    let mut att_stmt = None;
    let mut auth_data = None;
    for (key, value) in entries {
        let Value::Text(name) = key else { continue };
        match (name.as_str(), value) {
            ("fmt", Value::Text(s)) => fmt = Some(s),
            ("attStmt", Value::Map(m)) => att_stmt = Some(m),
            ("authData", Value::Bytes(b)) => auth_data = Some(b),
            _ => {}
        }
    }

    Ok(AttestationObject {
        fmt: fmt.ok_or_else(|| PasskeyError::malformed("attestationObject missing fmt"))?,
        att_stmt: att_stmt.unwrap_or_default(),
        auth_data: auth_data
            .ok_or_else(|| PasskeyError::malformed("attestationObject missing authData"))?,
    })
}

/// Check the attestation statement.
///
/// `none` carries nothing to check. `packed` without a certificate chain is
/// self-attestation and must verify with the credential key itself. Formats
/// with certificate chains are treated as verified by the upstream ceremony.
fn verify_attestation_statement(
    attestation: &AttestationObject,
    key: &CoseKey,
    client_data_hash: &[u8],
) -> Result<(), PasskeyError> {
    match attestation.fmt.as_str() {
        "none" => Ok(()),
        "packed" => {
            let has_chain = stmt_entry(&attestation.att_stmt, "x5c").is_some();
            if has_chain {
                tracing::debug!("accepting packed attestation with certificate chain unchecked");
                return Ok(());
            }

            let alg = stmt_entry(&attestation.att_stmt, "alg")
                .and_then(|v| match v {
                    Value::Integer(i) => Some(i128::from(*i)),
                    _ => None,
                })
                .ok_or_else(|| PasskeyError::malformed("packed attStmt missing alg"))?;
            if alg != i128::from(key.algorithm()) {
                return Err(PasskeyError::ceremony(
                    "attestation algorithm does not match the credential key",
                ));
            }

            let sig = stmt_entry(&attestation.att_stmt, "sig")
                .and_then(|v| match v {
                    Value::Bytes(b) => Some(b.clone()),
                    _ => None,
                })
                .ok_or_else(|| PasskeyError::malformed("packed attStmt missing sig"))?;

            let mut message = attestation.auth_data.clone();
            message.extend_from_slice(client_data_hash);
            key.verify(&message, &sig)
        }
        other => {
            tracing::debug!(fmt = other, "accepting unrecognized attestation format unchecked");
            Ok(())
        }
    }
}

fn stmt_entry<'a>(entries: &'a [(Value, Value)], name: &str) -> Option<&'a Value> {
    entries.iter().find_map(|(key, value)| match key {
        Value::Text(s) if s == name => Some(value),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{RP_ID, SoftKey};

    const ORIGIN: &str = "https://booking.example.com";

    #[test]
    fn test_registration_round_trip() {
        let soft = SoftKey::new();
        let response = soft.attestation("chal-1", ORIGIN, RP_ID);

        let credential = verify_registration(&response, "chal-1", ORIGIN, RP_ID).unwrap();
        assert_eq!(credential.credential_id, soft.credential_id);
        assert_eq!(credential.counter, 0);
        assert!(CoseKey::parse(&credential.public_key).is_ok());
    }

    #[test]
    fn test_registration_challenge_mismatch() {
        let soft = SoftKey::new();
        let response = soft.attestation("stale", ORIGIN, RP_ID);
        let err = verify_registration(&response, "fresh", ORIGIN, RP_ID).unwrap_err();
        assert!(matches!(err, PasskeyError::ChallengeMismatch));
    }

    #[test]
    fn test_registration_origin_mismatch() {
        let soft = SoftKey::new();
        let response = soft.attestation("chal", "https://evil.example.com", RP_ID);
        let err = verify_registration(&response, "chal", ORIGIN, RP_ID).unwrap_err();
        assert!(matches!(err, PasskeyError::CeremonyFailed(_)));
    }

    #[test]
    fn test_registration_rp_id_mismatch() {
        let soft = SoftKey::new();
        let response = soft.attestation("chal", ORIGIN, "other.example.com");
        let err = verify_registration(&response, "chal", ORIGIN, RP_ID).unwrap_err();
        assert!(matches!(err, PasskeyError::CeremonyFailed(_)));
    }

    #[test]
    fn test_registration_packed_self_attestation() {
        let soft = SoftKey::new();
        let response = soft.packed_attestation("chal", ORIGIN, RP_ID);
        verify_registration(&response, "chal", ORIGIN, RP_ID).unwrap();
    }

    #[test]
    fn test_registration_raw_id_mismatch() {
        let soft = SoftKey::new();
        let mut response = soft.attestation("chal", ORIGIN, RP_ID);
        response.raw_id = "AAAA".to_string();
        let err = verify_registration(&response, "chal", ORIGIN, RP_ID).unwrap_err();
        assert!(matches!(err, PasskeyError::CeremonyFailed(_)));
    }
}
