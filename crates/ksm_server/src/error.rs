//! KSM error types

use ksm_crypto::CryptoError;
use ksm_protocol::TllvError;
use thiserror::Error;

/// Errors returned by SPC parsing and CKC assembly
///
/// Every error is terminal for the request that produced it.
#[derive(Debug, Error)]
pub enum KsmError {
    /// Frame or protocol version this server does not handle
    #[error("unsupported {context} version: {version}")]
    UnsupportedVersion { context: &'static str, version: u32 },

    /// Framing, length or tag-presence violation in an SPC
    #[error("malformed SPC: {reason}")]
    MalformedSpc { reason: String },

    /// The SPC could not be authenticated
    ///
    /// Covers certificate mismatch, session key unwrap failure and a payload
    /// that does not decrypt to a valid record stream. The cause is never
    /// part of the error.
    #[error("SPC authentication failed")]
    AuthenticationFailed,

    /// The session key integrity record does not match
    #[error("session key integrity check failed")]
    IntegrityCheckFailed,

    /// The content key provider could not issue a key
    #[error("content key unavailable: {reason}")]
    ContentKeyUnavailable { reason: String },

    /// TLLV encode/decode failure
    #[error("TLLV error: {0}")]
    Codec(#[from] TllvError),

    /// A CKC that cannot be decoded
    #[error("malformed CKC: {reason}")]
    MalformedCkc { reason: String },

    /// Invalid server configuration
    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    /// Symmetric cipher misuse
    #[error("cipher error: {0}")]
    Crypto(#[from] CryptoError),
}

impl KsmError {
    pub(crate) fn malformed_spc(reason: impl Into<String>) -> Self {
        KsmError::MalformedSpc {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_ckc(reason: impl Into<String>) -> Self {
        KsmError::MalformedCkc {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        KsmError::Config {
            reason: reason.into(),
        }
    }

    /// Always false: a failed exchange needs a fresh SPC from the client
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Returns a suggestion for how to fix this error, if available
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            KsmError::UnsupportedVersion { .. } => {
                Some("Check the client's protocol version against supported_spc_versions")
            }
            KsmError::AuthenticationFailed => {
                Some("Verify the SPC was produced for this server's certificate")
            }
            KsmError::IntegrityCheckFailed => Some("Request a fresh SPC from the client"),
            KsmError::ContentKeyUnavailable { .. } => {
                Some("Check that the key store has an entry for the asset")
            }
            KsmError::Config { .. } => Some("Fix the configuration file and restart"),
            _ => None,
        }
    }

    /// Returns an error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            KsmError::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            KsmError::MalformedSpc { .. } => "MALFORMED_SPC",
            KsmError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            KsmError::IntegrityCheckFailed => "INTEGRITY_CHECK_FAILED",
            KsmError::ContentKeyUnavailable { .. } => "CONTENT_KEY_UNAVAILABLE",
            KsmError::Codec(TllvError::MalformedTllv { .. }) => "MALFORMED_TLLV",
            KsmError::Codec(TllvError::InvalidRecordLength { .. }) => "INVALID_RECORD_LENGTH",
            KsmError::MalformedCkc { .. } => "MALFORMED_CKC",
            KsmError::Config { .. } => "CONFIG_ERROR",
            KsmError::Crypto(_) => "CRYPTO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksm_protocol::Tag;

    #[test]
    fn test_error_codes() {
        assert_eq!(KsmError::AuthenticationFailed.error_code(), "AUTHENTICATION_FAILED");
        assert_eq!(
            KsmError::from(TllvError::InvalidRecordLength {
                tag: Tag::R2,
                reason: "x".into()
            })
            .error_code(),
            "INVALID_RECORD_LENGTH"
        );
    }

    #[test]
    fn test_nothing_is_retryable() {
        assert!(!KsmError::IntegrityCheckFailed.is_retryable());
        assert!(!KsmError::malformed_spc("short").is_retryable());
    }

    #[test]
    fn test_authentication_failure_is_opaque() {
        assert_eq!(
            KsmError::AuthenticationFailed.to_string(),
            "SPC authentication failed"
        );
    }
}
