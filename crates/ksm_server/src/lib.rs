//! Key Security Module for the SPC/CKC key exchange
//!
//! A client sends a Server Playback Context (SPC); the server authenticates it,
//! recovers the session key, and answers with a Content Key Context (CKC)
//! carrying the content key encrypted for that session.
//!
//! ```text
//! SPC bytes ─► SpcParser ─► ParsedSpc ─► CkcBuilder ─► CKC bytes
//!               │                          │
//!               ├ RSA-OAEP unwrap (R1)     ├ RSA-OAEP unwrap (R1')
//!               ├ key derivation           ├ integrity check (CMAC)
//!               └ AES-CBC + TLLV decode    ├ content key provider
//!                                          └ TLLV encode + AES-CBC
//! ```
//!
//! The server certificate and private key are injected already decoded; this
//! crate does no file I/O and never parses PEM.

pub mod ckc;
pub mod config;
pub mod content_key;
pub mod debug;
pub mod error;
pub mod keypair;
pub mod service;
pub mod spc;
pub mod types;
pub mod unwrap;

pub use ckc::{build_ckc, CkcBuilder};
pub use config::{DuplicateTagPolicy, KsmConfig};
pub use content_key::{
    ContentKeyProvider, FixedContentKey, ProviderError, RandomContentKey, StaticContentKeys,
};
pub use debug::{debug_decode, CkcSummary, RecordSummary};
pub use error::KsmError;
pub use keypair::{ServerCertificate, ServerCredentials};
pub use service::Ksm;
pub use spc::{parse_spc, ParsedSpc, SpcParser};
pub use types::{AssetContext, ContentKey};
pub use unwrap::{unwrap_session_secret, UnwrapFailed};
