//! Zeroizing key types
//!
//! Every secret in a key exchange is 16 bytes: the unwrapped session secret
//! and the keys derived from it. Wrong lengths are rejected at construction.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of every AES-128 key and block handled here
pub const KEY_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

fn copy_exact(bytes: &[u8]) -> Result<[u8; KEY_SIZE], KeyError> {
    if bytes.len() != KEY_SIZE {
        return Err(KeyError::InvalidLength {
            expected: KEY_SIZE,
            got: bytes.len(),
        });
    }
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(bytes);
    Ok(key)
}

/// Unwrapped session secret (R1), zeroized on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionSecret(pub(crate) [u8; KEY_SIZE]);

impl SessionSecret {
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        SessionSecret(bytes)
    }

    /// Create a session secret from a 16-byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        copy_exact(bytes).map(SessionSecret)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// AES-128 key, zeroized on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey(pub(crate) [u8; KEY_SIZE]);

impl SymmetricKey {
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        SymmetricKey(bytes)
    }

    /// Create a key from a 16-byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        copy_exact(bytes).map(SymmetricKey)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

// Neither type ever prints its bytes.
impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret([REDACTED])")
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}
