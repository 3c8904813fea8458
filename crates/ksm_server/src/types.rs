//! Request-scoped values handed to and from the content key provider

use std::fmt;

use ksm_crypto::{generate_iv, generate_key, KeyError, KEY_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// What the client asked a key for
#[derive(Clone, PartialEq, Eq)]
pub struct AssetContext {
    pub asset_id: Vec<u8>,
    pub transaction_id: Vec<u8>,
}

impl fmt::Debug for AssetContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetContext")
            .field("asset_id", &hex::encode(&self.asset_id))
            .field("transaction_id", &hex::encode(&self.transaction_id))
            .finish()
    }
}

/// Content key and the IV the client decrypts media with
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ContentKey {
    key: [u8; KEY_SIZE],
    iv: [u8; KEY_SIZE],
}

impl ContentKey {
    pub fn new(key: [u8; KEY_SIZE], iv: [u8; KEY_SIZE]) -> Self {
        Self { key, iv }
    }

    /// Build from slices, rejecting anything but 16 bytes each
    pub fn from_slices(key: &[u8], iv: &[u8]) -> Result<Self, KeyError> {
        let key = ksm_crypto::SymmetricKey::from_slice(key)?;
        let iv = ksm_crypto::SymmetricKey::from_slice(iv)?;
        Ok(Self::new(*key.as_bytes(), *iv.as_bytes()))
    }

    /// Fresh random key and IV
    pub fn random() -> Self {
        Self::new(*generate_key().as_bytes(), generate_iv())
    }

    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    pub fn iv(&self) -> &[u8; KEY_SIZE] {
        &self.iv
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slices_lengths() {
        assert!(ContentKey::from_slices(&[1; 16], &[2; 16]).is_ok());
        assert_eq!(
            ContentKey::from_slices(&[1; 32], &[2; 16]).unwrap_err(),
            KeyError::InvalidLength {
                expected: 16,
                got: 32
            }
        );
        assert!(ContentKey::from_slices(&[1; 16], &[2; 8]).is_err());
    }

    #[test]
    fn test_random_keys_differ() {
        assert_ne!(ContentKey::random().key(), ContentKey::random().key());
    }

    #[test]
    fn test_asset_context_debug_is_hex() {
        let context = AssetContext {
            asset_id: vec![0xaa, 0xbb],
            transaction_id: vec![0x01],
        };
        assert!(format!("{:?}", context).contains("aabb"));
    }
}
