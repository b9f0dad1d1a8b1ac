//! COSE public key parsing and signature verification.
//!
//! Keys are stored as the raw CBOR bytes the authenticator produced and
//! re-parsed on every use, so a stored credential can never drift from what
//! was attested.

use crate::error::PasskeyError;
use ciborium::Value;
use p256::ecdsa::signature::Verifier;

/// COSE algorithm identifier for ECDSA P-256 with SHA-256.
pub const ALG_ES256: i64 = -7;
/// COSE algorithm identifier for EdDSA (Ed25519).
pub const ALG_EDDSA: i64 = -8;

const KTY_OKP: i128 = 1;
const KTY_EC2: i128 = 2;
const CRV_P256: i128 = 1;
const CRV_ED25519: i128 = 6;

/// A parsed COSE credential public key.
#[derive(Debug, Clone)]
pub enum CoseKey {
    /// ECDSA P-256 (ES256).
    P256 { x: [u8; 32], y: [u8; 32] },
    /// Ed25519 (EdDSA).
    Ed25519 { x: [u8; 32] },
}

impl CoseKey {
    /// Parse a COSE key from its CBOR encoding.
    pub fn parse(bytes: &[u8]) -> Result<Self, PasskeyError> {
        let value: Value = ciborium::de::from_reader(bytes)
            .map_err(|e| PasskeyError::malformed(format!("COSE key: {e}")))?;
        let Value::Map(entries) = value else {
            return Err(PasskeyError::malformed("COSE key is not a CBOR map"));
        };

        let mut kty = None;
        let mut alg = None;
        let mut crv = None;
        let mut x = None;
        let mut y = None;
        for (key, value) in entries {
            let Value::Integer(label) = key else {
                continue;
            };
            match i128::from(label) {
                1 => kty = as_int(&value),
                3 => alg = as_int(&value),
                -1 => crv = as_int(&value),
                -2 => x = as_bytes(&value),
                -3 => y = as_bytes(&value),
                _ => {}
            }
        }

        let alg = alg.ok_or_else(|| PasskeyError::malformed("COSE key missing alg"))?;
        match (alg, kty, crv) {
            (a, Some(KTY_EC2), Some(CRV_P256)) if a == i128::from(ALG_ES256) => Ok(CoseKey::P256 {
                x: coordinate(x, "x")?,
                y: coordinate(y, "y")?,
            }),
            (a, Some(KTY_OKP), Some(CRV_ED25519)) if a == i128::from(ALG_EDDSA) => {
                Ok(CoseKey::Ed25519 {
                    x: coordinate(x, "x")?,
                })
            }
            _ => Err(PasskeyError::UnsupportedAlgorithm(alg as i64)),
        }
    }

    /// The COSE algorithm identifier of this key.
    pub fn algorithm(&self) -> i64 {
        match self {
            CoseKey::P256 { .. } => ALG_ES256,
            CoseKey::Ed25519 { .. } => ALG_EDDSA,
        }
    }

    /// Verify `signature` over `message` with this key.
    ///
    /// ES256 signatures arrive ASN.1 DER-encoded (as the WebAuthn API emits
    /// them); Ed25519 signatures are the raw 64 bytes.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), PasskeyError> {
        match self {
            CoseKey::P256 { x, y } => {
                let mut point = Vec::with_capacity(65);
                point.push(0x04);
                point.extend_from_slice(x);
                point.extend_from_slice(y);
                let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&point)
                    .map_err(|e| PasskeyError::malformed(format!("stored P-256 key: {e}")))?;
                let signature = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|e| PasskeyError::malformed(format!("ES256 signature: {e}")))?;
                key.verify(message, &signature)
                    .map_err(|_| PasskeyError::ceremony("assertion signature is invalid"))
            }
            CoseKey::Ed25519 { x } => {
                let key = ed25519_dalek::VerifyingKey::from_bytes(x)
                    .map_err(|e| PasskeyError::malformed(format!("stored Ed25519 key: {e}")))?;
                let signature = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|e| PasskeyError::malformed(format!("EdDSA signature: {e}")))?;
                key.verify(message, &signature)
                    .map_err(|_| PasskeyError::ceremony("assertion signature is invalid"))
            }
        }
    }
}

fn as_int(value: &Value) -> Option<i128> {
    match value {
        Value::Integer(i) => Some(i128::from(*i)),
        _ => None,
    }
}

fn as_bytes(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Bytes(b) => Some(b.clone()),
        _ => None,
    }
}

fn coordinate(value: Option<Vec<u8>>, name: &str) -> Result<[u8; 32], PasskeyError> {
    let bytes = value
        .ok_or_else(|| PasskeyError::malformed(format!("COSE key missing {name} coordinate")))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        PasskeyError::malformed(format!(
            "COSE {name} coordinate has {} bytes, expected 32",
            bytes.len()
        ))
    })
}

/// Encode a P-256 verifying key as a COSE key (CBOR bytes).
///
/// Used when synthesizing test credentials; authenticators produce this
/// encoding natively.
pub fn encode_p256(key: &p256::ecdsa::VerifyingKey) -> Vec<u8> {
    let point = key.to_encoded_point(false);
    let x = point.x().map(|b| b.to_vec()).unwrap_or_default();
    let y = point.y().map(|b| b.to_vec()).unwrap_or_default();

    let map = Value::Map(vec![
        (Value::Integer(1.into()), Value::Integer((KTY_EC2 as i64).into())),
        (Value::Integer(3.into()), Value::Integer(ALG_ES256.into())),
        (
            Value::Integer((-1i64).into()),
            Value::Integer((CRV_P256 as i64).into()),
        ),
        (Value::Integer((-2i64).into()), Value::Bytes(x)),
        (Value::Integer((-3i64).into()), Value::Bytes(y)),
    ]);
    let mut out = Vec::new();
    ciborium::ser::into_writer(&map, &mut out).expect("writing CBOR to a Vec cannot fail");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;
    use p256::ecdsa::signature::Signer;

    fn signing_key() -> SigningKey {
        SigningKey::from_slice(&[7u8; 32]).unwrap()
    }

    #[test]
    fn test_p256_roundtrip_verify() {
        let sk = signing_key();
        let cose = encode_p256(sk.verifying_key());
        let key = CoseKey::parse(&cose).unwrap();
        assert_eq!(key.algorithm(), ALG_ES256);

        let message = b"authenticated bytes";
        let signature: p256::ecdsa::Signature = sk.sign(message);
        key.verify(message, signature.to_der().as_bytes()).unwrap();
    }

    #[test]
    fn test_p256_rejects_tampered_message() {
        let sk = signing_key();
        let key = CoseKey::parse(&encode_p256(sk.verifying_key())).unwrap();
        let signature: p256::ecdsa::Signature = sk.sign(b"original");
        let err = key
            .verify(b"tampered", signature.to_der().as_bytes())
            .unwrap_err();
        assert!(matches!(err, PasskeyError::CeremonyFailed(_)));
    }

    #[test]
    fn test_unsupported_algorithm_rejected() {
        // RS256 (-257) key shape
        let map = Value::Map(vec![
            (Value::Integer(1.into()), Value::Integer(3.into())),
            (Value::Integer(3.into()), Value::Integer((-257i64).into())),
        ]);
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&map, &mut bytes).unwrap();

        let err = CoseKey::parse(&bytes).unwrap_err();
        assert!(matches!(err, PasskeyError::UnsupportedAlgorithm(-257)));
    }

    #[test]
    fn test_missing_coordinate_rejected() {
        let map = Value::Map(vec![
            (Value::Integer(1.into()), Value::Integer(2.into())),
            (Value::Integer(3.into()), Value::Integer((-7i64).into())),
            (Value::Integer((-1i64).into()), Value::Integer(1.into())),
            (Value::Integer((-2i64).into()), Value::Bytes(vec![0u8; 32])),
        ]);
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&map, &mut bytes).unwrap();
        assert!(CoseKey::parse(&bytes).is_err());
    }
}
