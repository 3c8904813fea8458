//! AES-CMAC integrity values with constant-time verification

use aes::Aes128;
use cmac::{Cmac, Mac};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::types::SymmetricKey;

/// Size of an AES-CMAC tag
pub const CMAC_SIZE: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Integrity verification failed")]
    VerificationFailed,
}

/// AES-128-CMAC (RFC 4493) over `data`
pub fn calculate_cmac(key: &SymmetricKey, data: &[u8]) -> [u8; CMAC_SIZE] {
    let mut mac = <Cmac<Aes128> as Mac>::new(key.as_bytes().into());
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// AES-128-CMAC over several parts, as if concatenated
pub fn calculate_cmac_parts(key: &SymmetricKey, parts: &[&[u8]]) -> [u8; CMAC_SIZE] {
    let mut mac = <Cmac<Aes128> as Mac>::new(key.as_bytes().into());
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

/// Verify a CMAC in constant time
///
/// A tag of the wrong length fails like any other mismatch.
pub fn verify_cmac(key: &SymmetricKey, data: &[u8], expected: &[u8]) -> Result<(), IntegrityError> {
    let calculated = calculate_cmac(key, data);
    if constant_time_eq(&calculated, expected) {
        Ok(())
    } else {
        Err(IntegrityError::VerificationFailed)
    }
}

/// Constant-time byte comparison
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfc4493_key() -> SymmetricKey {
        SymmetricKey::from_slice(&hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap()).unwrap()
    }

    #[test]
    fn test_cmac_rfc4493_vectors() {
        let key = rfc4493_key();
        assert_eq!(
            hex::encode(calculate_cmac(&key, &[])),
            "bb1d6929e95937287fa37d129b756746"
        );

        let message = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        assert_eq!(
            hex::encode(calculate_cmac(&key, &message)),
            "070a16b46b4d4144f79bdd9dd04a287c"
        );
    }

    #[test]
    fn test_cmac_parts_matches_concatenation() {
        let key = rfc4493_key();
        let whole = calculate_cmac(&key, b"tag-and-value-bytes");
        let split = calculate_cmac_parts(&key, &[b"tag-", b"and-value", b"-bytes"]);
        assert_eq!(whole, split);
    }

    #[test]
    fn test_verify_roundtrip() {
        let key = rfc4493_key();
        let tag = calculate_cmac(&key, b"session key record");
        assert!(verify_cmac(&key, b"session key record", &tag).is_ok());
    }

    #[test]
    fn test_verify_fails_on_flipped_byte() {
        let key = rfc4493_key();
        let mut tag = calculate_cmac(&key, b"session key record");
        tag[7] ^= 0x01;
        assert_eq!(
            verify_cmac(&key, b"session key record", &tag),
            Err(IntegrityError::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_fails_on_wrong_length() {
        let key = rfc4493_key();
        let tag = calculate_cmac(&key, b"data");
        assert!(verify_cmac(&key, b"data", &tag[..15]).is_err());
    }
}
