//! RSA-OAEP unwrap of the session secret
//!
//! Every failure, whatever the cause, becomes the same [`UnwrapFailed`] so a
//! caller cannot tell bad padding from a bad length.

use ksm_crypto::{KeyEncapsulation, RsaOaepKem, SessionSecret};
use rsa::RsaPrivateKey;
use thiserror::Error;
use tracing::debug;

/// Opaque unwrap failure
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("session key unwrap failed")]
pub struct UnwrapFailed;

/// Recover a 16-byte session secret wrapped with RSA-OAEP (SHA-1)
pub fn unwrap_session_secret(
    wrapped: &[u8],
    private_key: &RsaPrivateKey,
) -> Result<SessionSecret, UnwrapFailed> {
    let kem = RsaOaepKem::with_sha1();
    let plaintext = kem.unwrap(wrapped, private_key).map_err(|e| {
        debug!(error = %e, "RSA-OAEP unwrap rejected");
        UnwrapFailed
    })?;

    SessionSecret::from_slice(&plaintext).map_err(|e| {
        debug!(error = %e, "unwrapped session secret has wrong length");
        UnwrapFailed
    })
}
