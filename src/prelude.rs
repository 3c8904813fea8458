//! KSM Prelude
//!
//! Commonly used types in one import.
//!
//! # Example
//!
//! ```rust
//! use ksm::prelude::*;
//!
//! let config = KsmConfig::from_json(r#"{ "duplicate_tags": "reject" }"#).unwrap();
//! assert_eq!(config.duplicate_tags, DuplicateTagPolicy::Reject);
//! ```

// Service and pipeline
pub use ksm_server::{
    build_ckc, debug_decode, parse_spc, CkcBuilder, Ksm, KsmConfig, ParsedSpc, SpcParser,
};

// Inputs and providers
pub use ksm_server::{
    AssetContext, ContentKey, ContentKeyProvider, DuplicateTagPolicy, FixedContentKey,
    RandomContentKey, ServerCertificate, ServerCredentials, StaticContentKeys,
};

// Wire types
pub use ksm_protocol::{CkcFrame, SpcFrame, SpcVersion, Tag, TllvRecord};

// Key material
pub use ksm_crypto::{
    AesEcbDerivation, CmacDerivation, KeyDerivation, KeyPurpose, SessionKeys, SessionSecret,
};

// Errors
pub use crate::error::Error;
pub use ksm_server::{KsmError, ProviderError};
