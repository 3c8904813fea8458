//! SPC/CKC wire types
//!
//! This crate contains the binary layouts used by the key exchange:
//! - TLLV records and the codec for record streams
//! - The tag registry
//! - SPC and CKC outer frames
//!
//! This crate contains NO cryptographic operations and NO I/O.

pub mod binary;
pub mod ckc;
pub mod frame;
pub mod spc;
pub mod tag;
pub mod tllv;

pub use ckc::{CkcFrame, CKC_HEADER_SIZE};
pub use frame::{FrameError, IV_SIZE};
pub use spc::{SpcFrame, SpcVersion, CERTIFICATE_HASH_SIZE};
pub use tag::Tag;
pub use tllv::{
    decode_records, encode_records, first_duplicate, index_by_tag, TllvError, TllvRecord,
    TLLV_ALIGNMENT, TLLV_HEADER_SIZE,
};
