//! Unified error type for the public API
//!
//! The workspace crates keep their own error types for precise handling; this
//! one wraps them for callers that only need a single `Result`.
//!
//! # Example
//!
//! ```no_run
//! use ksm::Error;
//!
//! fn answer(spc: &[u8]) -> Result<Vec<u8>, Error> {
//!     // Every workspace error converts with `?`
//!     # let _ = spc;
//!     Ok(Vec::new())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all KSM operations
///
/// # Error Categories
///
/// - **Ksm**: SPC parsing and CKC assembly
/// - **Codec**: TLLV record encoding or decoding outside an exchange
/// - **Frame**: SPC/CKC header reads outside an exchange
/// - **Key**: key material of the wrong length
/// - **Provider**: content key lookups
#[derive(Debug, Error)]
pub enum Error {
    /// Exchange error
    #[error("KSM error: {0}")]
    Ksm(#[from] ksm_server::KsmError),

    /// TLLV codec error
    #[error("TLLV error: {0}")]
    Codec(#[from] ksm_protocol::TllvError),

    /// Frame header error
    #[error("Frame error: {0}")]
    Frame(#[from] ksm_protocol::FrameError),

    /// Key format or length error
    #[error("Key error: {0}")]
    Key(#[from] ksm_crypto::KeyError),

    /// Content key provider error
    #[error("Provider error: {0}")]
    Provider(#[from] ksm_server::ProviderError),
}

impl Error {
    /// Always false; a failed exchange needs a fresh SPC
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ksm(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Returns a suggestion for resolving this error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Ksm(e) => e.suggestion(),
            _ => None,
        }
    }

    /// Returns true if the SPC could not be authenticated or its integrity
    /// record did not match
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            Self::Ksm(
                ksm_server::KsmError::AuthenticationFailed
                    | ksm_server::KsmError::IntegrityCheckFailed
            )
        )
    }

    /// Returns true if the input bytes were malformed
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::Codec(_)
                | Self::Frame(_)
                | Self::Ksm(
                    ksm_server::KsmError::MalformedSpc { .. }
                        | ksm_server::KsmError::MalformedCkc { .. }
                        | ksm_server::KsmError::Codec(_)
                        | ksm_server::KsmError::UnsupportedVersion { .. }
                )
        )
    }

    /// Returns true if this is a key material error
    pub fn is_key_error(&self) -> bool {
        matches!(self, Self::Key(_))
    }

    /// Returns true if the content key could not be issued
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::Ksm(ksm_server::KsmError::ContentKeyUnavailable { .. })
        )
    }
}
