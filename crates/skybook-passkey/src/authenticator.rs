//! Authenticator data parsing.
//!
//! The authenticator data layout (WebAuthn §6.1):
//!
//! ```text
//! rpIdHash (32) | flags (1) | signCount (4, BE) | [attestedCredentialData] | [extensions]
//! attestedCredentialData = aaguid (16) | credentialIdLength (2, BE) | credentialId | COSE key (CBOR)
//! ```

use crate::error::PasskeyError;
use sha2::{Digest, Sha256};
use std::io::Cursor;

/// User presence flag.
pub const FLAG_USER_PRESENT: u8 = 0x01;
/// User verification flag.
pub const FLAG_USER_VERIFIED: u8 = 0x04;
/// Attested credential data is included.
pub const FLAG_ATTESTED_CREDENTIAL_DATA: u8 = 0x40;

/// Parsed authenticator data.
#[derive(Debug, Clone)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; 32],
    pub flags: u8,
    pub counter: u32,
    pub attested_credential: Option<AttestedCredential>,
}

/// Credential material attached during registration.
#[derive(Debug, Clone)]
pub struct AttestedCredential {
    pub aaguid: [u8; 16],
    pub credential_id: Vec<u8>,
    /// COSE public key, kept as raw CBOR bytes for storage.
    pub public_key: Vec<u8>,
}

impl AuthenticatorData {
    /// Parse raw authenticator data bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, PasskeyError> {
        if bytes.len() < 37 {
            return Err(PasskeyError::malformed(format!(
                "authenticator data too short ({} bytes)",
                bytes.len()
            )));
        }

        let mut rp_id_hash = [0u8; 32];
        rp_id_hash.copy_from_slice(&bytes[..32]);
        let flags = bytes[32];
        let counter = u32::from_be_bytes([bytes[33], bytes[34], bytes[35], bytes[36]]);

        let attested_credential = if flags & FLAG_ATTESTED_CREDENTIAL_DATA != 0 {
            Some(parse_attested_credential(&bytes[37..])?)
        } else {
            None
        };

        Ok(Self {
            rp_id_hash,
            flags,
            counter,
            attested_credential,
        })
    }

    pub fn user_present(&self) -> bool {
        self.flags & FLAG_USER_PRESENT != 0
    }

    pub fn user_verified(&self) -> bool {
        self.flags & FLAG_USER_VERIFIED != 0
    }

    /// Whether the rpIdHash matches the given relying-party id.
    pub fn rp_id_matches(&self, rp_id: &str) -> bool {
        let expected: [u8; 32] = Sha256::digest(rp_id.as_bytes()).into();
        self.rp_id_hash == expected
    }
}

fn parse_attested_credential(bytes: &[u8]) -> Result<AttestedCredential, PasskeyError> {
    if bytes.len() < 18 {
        return Err(PasskeyError::malformed(
            "attested credential data truncated",
        ));
    }

    let mut aaguid = [0u8; 16];
    aaguid.copy_from_slice(&bytes[..16]);
    let id_len = u16::from_be_bytes([bytes[16], bytes[17]]) as usize;

    let id_end = 18 + id_len;
    if bytes.len() < id_end {
        return Err(PasskeyError::malformed(
            "credential id extends past the end of authenticator data",
        ));
    }
    let credential_id = bytes[18..id_end].to_vec();

    // The COSE key is a single CBOR item; extensions may follow it, so take
    // exactly the bytes the CBOR decoder consumed.
    let mut cursor = Cursor::new(&bytes[id_end..]);
    let _: ciborium::Value = ciborium::de::from_reader(&mut cursor)
        .map_err(|e| PasskeyError::malformed(format!("credential public key: {e}")))?;
    let key_len = cursor.position() as usize;
    let public_key = bytes[id_end..id_end + key_len].to_vec();

    Ok(AttestedCredential {
        aaguid,
        credential_id,
        public_key,
    })
}
