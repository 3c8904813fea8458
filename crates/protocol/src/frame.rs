//! Outer framing shared by SPC and CKC messages

use std::io::Cursor;

use thiserror::Error;

use crate::binary::{read_array, read_bytes, read_u32_be};

/// Size of an AES block IV carried in frame headers
pub const IV_SIZE: usize = 16;

/// Frame-level parse errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame truncated while reading {field}: need {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Unknown frame version {0}")]
    UnknownVersion(u32),

    #[error("Invalid payload length {length}: {reason}")]
    InvalidPayloadLength { length: usize, reason: &'static str },
}

/// Bounds-checked big-endian reader over a whole message
pub(crate) struct FrameReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> FrameReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len();
        len.saturating_sub(self.cursor.position() as usize)
    }

    fn truncated(&self, field: &'static str, needed: usize) -> FrameError {
        FrameError::Truncated {
            field,
            needed,
            available: self.remaining(),
        }
    }

    pub(crate) fn u32(&mut self, field: &'static str) -> Result<u32, FrameError> {
        if self.remaining() < 4 {
            return Err(self.truncated(field, 4));
        }
        read_u32_be(&mut self.cursor).map_err(|_| self.truncated(field, 4))
    }

    pub(crate) fn array<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<[u8; N], FrameError> {
        if self.remaining() < N {
            return Err(self.truncated(field, N));
        }
        read_array(&mut self.cursor).map_err(|_| self.truncated(field, N))
    }

    pub(crate) fn bytes(&mut self, n: usize, field: &'static str) -> Result<Vec<u8>, FrameError> {
        let available = self.remaining();
        read_bytes(&mut self.cursor, n, available).map_err(|_| self.truncated(field, n))
    }
}

/// Payloads are CBC ciphertext and must be whole, non-empty blocks
pub(crate) fn check_payload_length(length: usize) -> Result<(), FrameError> {
    if length == 0 {
        return Err(FrameError::InvalidPayloadLength {
            length,
            reason: "payload is empty",
        });
    }
    if length % IV_SIZE != 0 {
        return Err(FrameError::InvalidPayloadLength {
            length,
            reason: "payload is not a multiple of the cipher block size",
        });
    }
    Ok(())
}
