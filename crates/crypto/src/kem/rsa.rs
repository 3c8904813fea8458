//! RSA-OAEP Key Encapsulation Mechanism
//!
//! Session material is wrapped with RSA-OAEP using SHA-1 for both the label
//! hash and MGF1. SHA-256 is available for deployments that negotiate it.
//!
//! # Backend Selection
//!
//! - **aws-lc-provider** (default): private-key operations run on aws-lc-rs,
//!   which is constant-time. Keys aws-lc-rs refuses to load fall through to
//!   the RustCrypto path.
//! - Without it, every operation uses RustCrypto `rsa`, which carries the
//!   RUSTSEC-2023-0071 timing advisory.
//!
//! Wrapping is a public-key operation and always uses RustCrypto.

use super::{KemError, KeyEncapsulation};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::Sha256;
use zeroize::Zeroizing;

/// OAEP hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OaepHash {
    /// SHA-1, the hash the key exchange is defined with
    #[default]
    Sha1,

    /// SHA-256
    Sha256,
}

/// RSA-OAEP key encapsulation mechanism
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaOaepKem {
    /// Hash algorithm for OAEP padding
    pub hash: OaepHash,
}

impl RsaOaepKem {
    /// Create a new RSA-OAEP KEM with the specified hash algorithm
    pub fn new(hash: OaepHash) -> Self {
        RsaOaepKem { hash }
    }

    /// Create with SHA-1 (default)
    pub fn with_sha1() -> Self {
        Self::new(OaepHash::Sha1)
    }

    /// Create with SHA-256
    pub fn with_sha256() -> Self {
        Self::new(OaepHash::Sha256)
    }

    fn padding(&self) -> Oaep {
        match self.hash {
            OaepHash::Sha1 => Oaep::new::<Sha1>(),
            OaepHash::Sha256 => Oaep::new::<Sha256>(),
        }
    }
}

impl KeyEncapsulation for RsaOaepKem {
    type PublicKey = RsaPublicKey;
    type PrivateKey = RsaPrivateKey;

    fn ciphertext_size(&self, private_key: &RsaPrivateKey) -> usize {
        private_key.size()
    }

    fn wrap(&self, secret: &[u8], public_key: &RsaPublicKey) -> Result<Vec<u8>, KemError> {
        public_key
            .encrypt(&mut OsRng, self.padding(), secret)
            .map_err(|e| KemError::Wrap(e.to_string()))
    }

    fn unwrap(
        &self,
        ciphertext: &[u8],
        private_key: &RsaPrivateKey,
    ) -> Result<Zeroizing<Vec<u8>>, KemError> {
        let expected = self.ciphertext_size(private_key);
        if ciphertext.len() != expected {
            return Err(KemError::CiphertextLength {
                expected,
                got: ciphertext.len(),
            });
        }

        self.decrypt(ciphertext, private_key)
    }
}

impl RsaOaepKem {
    #[cfg(feature = "aws-lc-provider")]
    fn decrypt(
        &self,
        ciphertext: &[u8],
        private_key: &RsaPrivateKey,
    ) -> Result<Zeroizing<Vec<u8>>, KemError> {
        match aws_lc_impl::decrypting_key(private_key) {
            Some(key) => aws_lc_impl::decrypt(&key, self.hash, ciphertext),
            None => self.decrypt_rustcrypto(ciphertext, private_key),
        }
    }

    #[cfg(not(feature = "aws-lc-provider"))]
    fn decrypt(
        &self,
        ciphertext: &[u8],
        private_key: &RsaPrivateKey,
    ) -> Result<Zeroizing<Vec<u8>>, KemError> {
        self.decrypt_rustcrypto(ciphertext, private_key)
    }

    fn decrypt_rustcrypto(
        &self,
        ciphertext: &[u8],
        private_key: &RsaPrivateKey,
    ) -> Result<Zeroizing<Vec<u8>>, KemError> {
        private_key
            .decrypt(self.padding(), ciphertext)
            .map(Zeroizing::new)
            .map_err(|e| KemError::Unwrap(e.to_string()))
    }
}

// ============================================================================
// aws-lc-rs backend (default, constant-time)
// ============================================================================
#[cfg(feature = "aws-lc-provider")]
mod aws_lc_impl {
    use super::{KemError, OaepHash};
    use aws_lc_rs::rsa::{
        OaepPrivateDecryptingKey, PrivateDecryptingKey, OAEP_SHA1_MGF1SHA1,
        OAEP_SHA256_MGF1SHA256,
    };
    use rsa::pkcs8::EncodePrivateKey;
    use rsa::RsaPrivateKey;
    use zeroize::Zeroizing;

    /// Load the key into aws-lc-rs, or `None` when it refuses the key
    pub(super) fn decrypting_key(private_key: &RsaPrivateKey) -> Option<OaepPrivateDecryptingKey> {
        let der = private_key.to_pkcs8_der().ok()?;
        let key = PrivateDecryptingKey::from_pkcs8(der.as_bytes()).ok()?;
        OaepPrivateDecryptingKey::new(key).ok()
    }

    pub(super) fn decrypt(
        key: &OaepPrivateDecryptingKey,
        hash: OaepHash,
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, KemError> {
        let algorithm = match hash {
            OaepHash::Sha1 => &OAEP_SHA1_MGF1SHA1,
            OaepHash::Sha256 => &OAEP_SHA256_MGF1SHA256,
        };

        let mut buffer = Zeroizing::new(vec![0u8; key.min_output_size()]);
        let plaintext = key
            .decrypt(algorithm, ciphertext, buffer.as_mut_slice(), None)
            .map_err(|e| KemError::Unwrap(format!("RSA-OAEP decryption failed: {:?}", e)))?;
        Ok(Zeroizing::new(plaintext.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_test_keypair(bits: usize) -> (RsaPublicKey, RsaPrivateKey) {
        let private_key = RsaPrivateKey::new(&mut OsRng, bits).unwrap();
        (RsaPublicKey::from(&private_key), private_key)
    }

    #[test]
    fn test_rsa_oaep_roundtrip_sha1() {
        let (public_key, private_key) = generate_test_keypair(1024);
        let kem = RsaOaepKem::with_sha1();

        let key = [0x42u8; 16];
        let wrapped = kem.wrap(&key, &public_key).unwrap();
        assert_eq!(wrapped.len(), 128);

        let unwrapped = kem.unwrap(&wrapped, &private_key).unwrap();
        assert_eq!(key.as_slice(), unwrapped.as_slice());
    }

    #[test]
    fn test_rsa_oaep_roundtrip_sha256() {
        let (public_key, private_key) = generate_test_keypair(2048);
        let kem = RsaOaepKem::with_sha256();

        let key = [0x24u8; 16];
        let wrapped = kem.wrap(&key, &public_key).unwrap();
        assert_eq!(wrapped.len(), 256);
        assert_eq!(kem.unwrap(&wrapped, &private_key).unwrap().as_slice(), &key);
    }

    #[test]
    fn test_hash_mismatch_fails() {
        let (public_key, private_key) = generate_test_keypair(1024);
        let wrapped = RsaOaepKem::with_sha256().wrap(&[1u8; 16], &public_key).unwrap();
        assert!(RsaOaepKem::with_sha1().unwrap(&wrapped, &private_key).is_err());
    }

    #[test]
    fn test_rsa_unwrap_invalid_ciphertext() {
        let (public_key, private_key) = generate_test_keypair(1024);
        let kem = RsaOaepKem::default();

        let mut wrapped = kem.wrap(&[7u8; 16], &public_key).unwrap();
        wrapped[10] ^= 0xff;
        assert!(matches!(
            kem.unwrap(&wrapped, &private_key),
            Err(KemError::Unwrap(_))
        ));
    }

    #[cfg(feature = "aws-lc-provider")]
    #[test]
    fn test_aws_lc_backend_unwraps_2048_bit_keys() {
        let (public_key, private_key) = generate_test_keypair(2048);
        let key = aws_lc_impl::decrypting_key(&private_key).expect("aws-lc-rs loads RSA-2048");

        let wrapped = RsaOaepKem::with_sha1().wrap(&[0x5c; 16], &public_key).unwrap();
        let unwrapped = aws_lc_impl::decrypt(&key, OaepHash::Sha1, &wrapped).unwrap();
        assert_eq!(unwrapped.as_slice(), &[0x5c; 16]);

        let mut corrupt = wrapped.clone();
        corrupt[0] ^= 0x01;
        assert!(matches!(
            aws_lc_impl::decrypt(&key, OaepHash::Sha1, &corrupt),
            Err(KemError::Unwrap(_))
        ));
        assert!(aws_lc_impl::decrypt(&key, OaepHash::Sha256, &wrapped).is_err());
    }

    #[test]
    fn test_rsa_unwrap_wrong_size() {
        let (_, private_key) = generate_test_keypair(1024);
        let kem = RsaOaepKem::default();
        assert_eq!(kem.ciphertext_size(&private_key), 128);
        assert!(matches!(
            kem.unwrap(&[0u8; 127], &private_key),
            Err(KemError::CiphertextLength {
                expected: 128,
                got: 127
            })
        ));
    }
}
