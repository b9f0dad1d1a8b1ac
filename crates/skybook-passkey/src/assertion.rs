//! Assertion (authentication) verification.

use crate::authenticator::AuthenticatorData;
use crate::cose::CoseKey;
use crate::error::PasskeyError;
use crate::response::{AuthenticationResponse, decode_b64url, verify_client_data};
use sha2::{Digest, Sha256};

/// Verify an authentication response against the expected ceremony
/// parameters and the stored credential.
///
/// On success returns the new signature counter; the caller must persist it
/// before answering the client, or the replay guard has no teeth.
///
/// Replay rule: the reported counter must be strictly greater than the
/// stored one. Authenticators without a counter report zero forever, so a
/// zero counter is only accepted while the stored value is also zero.
pub fn verify_authentication(
    response: &AuthenticationResponse,
    expected_challenge: &str,
    expected_origin: &str,
    expected_rp_id: &str,
    stored_public_key: &[u8],
    stored_counter: u32,
) -> Result<u32, PasskeyError> {
    let client_data_bytes = verify_client_data(
        &response.response.client_data_json,
        "webauthn.get",
        expected_challenge,
        expected_origin,
    )?;

    let auth_data_bytes = decode_b64url("authenticatorData", &response.response.authenticator_data)?;
    let auth_data = AuthenticatorData::parse(&auth_data_bytes)?;

    if !auth_data.rp_id_matches(expected_rp_id) {
        return Err(PasskeyError::ceremony("relying-party id hash mismatch"));
    }
    if !auth_data.user_present() {
        return Err(PasskeyError::ceremony("user presence not asserted"));
    }

    let key = CoseKey::parse(stored_public_key)?;
    let signature = decode_b64url("signature", &response.response.signature)?;

    // Signature base: authenticatorData || SHA-256(clientDataJSON).
    let mut message = auth_data_bytes.clone();
    message.extend_from_slice(&Sha256::digest(&client_data_bytes));
    key.verify(&message, &signature)?;

    let received = auth_data.counter;
    if received > stored_counter || (received == 0 && stored_counter == 0) {
        Ok(received)
    } else {
        Err(PasskeyError::ReplayDetected {
            stored: stored_counter,
            received,
        })
    }
}
