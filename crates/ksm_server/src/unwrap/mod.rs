//! Asymmetric unwrap of client session material

pub mod rsa_unwrap;

pub use rsa_unwrap::{unwrap_session_secret, UnwrapFailed};
