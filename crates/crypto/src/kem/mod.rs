//! Key encapsulation
//!
//! Session material travels wrapped under the server's public key. The server
//! only ever unwraps; wrapping serves clients and tests.

use thiserror::Error;
use zeroize::Zeroizing;

pub mod rsa;

#[derive(Debug, Error)]
pub enum KemError {
    #[error("wrap failed: {0}")]
    Wrap(String),

    #[error("unwrap failed: {0}")]
    Unwrap(String),

    #[error("ciphertext is {got} bytes, key expects {expected}")]
    CiphertextLength { expected: usize, got: usize },
}

/// Asymmetric wrapping of short secrets
pub trait KeyEncapsulation {
    type PublicKey;
    type PrivateKey;

    /// Ciphertext size this key produces and accepts
    fn ciphertext_size(&self, private_key: &Self::PrivateKey) -> usize;

    fn wrap(&self, secret: &[u8], public_key: &Self::PublicKey) -> Result<Vec<u8>, KemError>;

    /// The recovered secret is cleared when dropped
    fn unwrap(
        &self,
        ciphertext: &[u8],
        private_key: &Self::PrivateKey,
    ) -> Result<Zeroizing<Vec<u8>>, KemError>;
}
