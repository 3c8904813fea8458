//! Key Security Module for the SPC/CKC streaming key exchange
//!
//! This crate is the facade over the workspace:
//! - [`protocol`]: TLLV records, tag registry and SPC/CKC frames
//! - [`crypto`]: AES/CMAC helpers, key derivation and RSA-OAEP
//! - [`server`]: SPC parsing, CKC assembly and the [`Ksm`] service
//!
//! # Example
//!
//! ```no_run
//! use ksm::prelude::*;
//!
//! # fn example(cert_der: Vec<u8>, key: ksm::crypto::rsa::RsaPrivateKey, spc: &[u8]) -> Result<(), ksm::Error> {
//! let credentials = ServerCredentials::new(ServerCertificate::from_der(cert_der), key);
//! let ksm = Ksm::with_config(credentials, KsmConfig::default())?;
//! let ckc = ksm.generate_ckc(spc, &RandomContentKey)?;
//! # let _ = ckc;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod prelude;

pub use ksm_crypto as crypto;
pub use ksm_protocol as protocol;
pub use ksm_server as server;

pub use error::Error;
pub use ksm_server::{
    build_ckc, debug_decode, parse_spc, AssetContext, CkcBuilder, CkcSummary, ContentKey,
    ContentKeyProvider, DuplicateTagPolicy, FixedContentKey, Ksm, KsmConfig, KsmError,
    ParsedSpc, ProviderError, RandomContentKey, RecordSummary, ServerCertificate,
    ServerCredentials, SpcParser, StaticContentKeys,
};
