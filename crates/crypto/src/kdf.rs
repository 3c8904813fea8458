//! Session key derivation
//!
//! Both session keys come from the unwrapped secret R1 through a one-way
//! function with a fixed 16-byte label per purpose. The construction is a
//! swappable strategy so a protocol version can bring its own.

use std::fmt;

use zeroize::ZeroizeOnDrop;

use crate::helpers::aes_ecb_encrypt_block;
use crate::integrity::calculate_cmac_parts;
use crate::types::{SessionSecret, SymmetricKey};

/// What a derived key will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPurpose {
    /// Encrypts the SPC and CKC record streams
    Encryption,
    /// Keys the CMAC integrity records
    Integrity,
}

impl KeyPurpose {
    /// Domain-separation label, exactly one AES block
    pub fn label(self) -> &'static [u8; 16] {
        match self {
            KeyPurpose::Encryption => b"ksm:session-enc\0",
            KeyPurpose::Integrity => b"ksm:session-int\0",
        }
    }
}

/// A derivation construction
pub trait KeyDerivation: Send + Sync {
    /// Short identifier for logs and configuration
    fn name(&self) -> &'static str;

    /// Derive the key for `purpose` from `secret`
    fn derive(&self, secret: &SessionSecret, purpose: KeyPurpose) -> SymmetricKey;
}

/// `AES-128-ECB_R1(label)`
#[derive(Debug, Clone, Copy, Default)]
pub struct AesEcbDerivation;

impl KeyDerivation for AesEcbDerivation {
    fn name(&self) -> &'static str {
        "aes-ecb"
    }

    fn derive(&self, secret: &SessionSecret, purpose: KeyPurpose) -> SymmetricKey {
        let r1 = SymmetricKey::new(*secret.as_bytes());
        SymmetricKey::new(aes_ecb_encrypt_block(&r1, purpose.label()))
    }
}

/// Counter-mode AES-CMAC: `CMAC_R1(0x01 ‖ label ‖ 0x00 ‖ 0x00000080)`
#[derive(Debug, Clone, Copy, Default)]
pub struct CmacDerivation;

impl CmacDerivation {
    const COUNTER: [u8; 1] = [0x01];
    const SEPARATOR: [u8; 1] = [0x00];
    // Output length in bits
    const LENGTH: [u8; 4] = [0x00, 0x00, 0x00, 0x80];
}

impl KeyDerivation for CmacDerivation {
    fn name(&self) -> &'static str {
        "aes-cmac"
    }

    fn derive(&self, secret: &SessionSecret, purpose: KeyPurpose) -> SymmetricKey {
        let r1 = SymmetricKey::new(*secret.as_bytes());
        SymmetricKey::new(calculate_cmac_parts(
            &r1,
            &[
                &Self::COUNTER,
                purpose.label(),
                &Self::SEPARATOR,
                &Self::LENGTH,
            ],
        ))
    }
}

/// Look up a derivation by its [`KeyDerivation::name`]
pub fn derivation_by_name(name: &str) -> Option<Box<dyn KeyDerivation>> {
    match name {
        "aes-ecb" => Some(Box::new(AesEcbDerivation)),
        "aes-cmac" => Some(Box::new(CmacDerivation)),
        _ => None,
    }
}

/// Encryption and integrity keys for one exchange
#[derive(Clone, ZeroizeOnDrop)]
pub struct SessionKeys {
    pub encryption: SymmetricKey,
    pub integrity: SymmetricKey,
}

impl SessionKeys {
    pub fn derive(derivation: &dyn KeyDerivation, secret: &SessionSecret) -> Self {
        Self {
            encryption: derivation.derive(secret, KeyPurpose::Encryption),
            integrity: derivation.derive(secret, KeyPurpose::Integrity),
        }
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKeys([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets() -> Vec<SessionSecret> {
        vec![
            SessionSecret::new([0u8; 16]),
            SessionSecret::new([0xff; 16]),
            SessionSecret::from_slice(&hex::decode("3d1a10b8bffac2ec3d1a10b8bffac2ec").unwrap())
                .unwrap(),
        ]
    }

    fn strategies() -> Vec<Box<dyn KeyDerivation>> {
        vec![Box::new(AesEcbDerivation), Box::new(CmacDerivation)]
    }

    #[test]
    fn test_derivation_is_deterministic() {
        for strategy in strategies() {
            for secret in secrets() {
                let a = strategy.derive(&secret, KeyPurpose::Encryption);
                let b = strategy.derive(&secret.clone(), KeyPurpose::Encryption);
                assert_eq!(a.as_bytes(), b.as_bytes(), "{}", strategy.name());
            }
        }
    }

    #[test]
    fn test_purposes_are_separated() {
        for strategy in strategies() {
            for secret in secrets() {
                let keys = SessionKeys::derive(strategy.as_ref(), &secret);
                assert_ne!(
                    keys.encryption.as_bytes(),
                    keys.integrity.as_bytes(),
                    "{}",
                    strategy.name()
                );
            }
        }
    }

    #[test]
    fn test_secrets_are_separated() {
        let all = secrets();
        let a = AesEcbDerivation.derive(&all[0], KeyPurpose::Integrity);
        let b = AesEcbDerivation.derive(&all[1], KeyPurpose::Integrity);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_strategies_differ() {
        let secret = SessionSecret::new([0x42; 16]);
        let ecb = AesEcbDerivation.derive(&secret, KeyPurpose::Encryption);
        let cmac = CmacDerivation.derive(&secret, KeyPurpose::Encryption);
        assert_ne!(ecb.as_bytes(), cmac.as_bytes());
    }

    #[test]
    fn test_ecb_derivation_is_single_block_encrypt() {
        let secret = SessionSecret::new([0x11; 16]);
        let expected = aes_ecb_encrypt_block(&SymmetricKey::new([0x11; 16]), b"ksm:session-enc\0");
        assert_eq!(
            AesEcbDerivation
                .derive(&secret, KeyPurpose::Encryption)
                .as_bytes(),
            &expected
        );
    }

    #[test]
    fn test_derivation_by_name() {
        assert_eq!(derivation_by_name("aes-cmac").unwrap().name(), "aes-cmac");
        assert_eq!(derivation_by_name("aes-ecb").unwrap().name(), "aes-ecb");
        assert!(derivation_by_name("hkdf").is_none());
    }
}
