//! CKC outer frame
//!
//! ```text
//! version (4) │ reserved (4) │ IV (16) │ payload length (4) │ payload
//! ```

use std::io::{self, Write};

use crate::binary::{length_to_u32, write_bytes, write_u32_be, BinaryWrite};
use crate::frame::{check_payload_length, FrameError, FrameReader, IV_SIZE};

/// Bytes before the payload
pub const CKC_HEADER_SIZE: usize = 4 + 4 + IV_SIZE + 4;

/// A framed CKC with its encrypted record stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CkcFrame {
    pub version: u32,
    pub reserved: u32,
    pub iv: [u8; IV_SIZE],
    pub payload: Vec<u8>,
}

impl CkcFrame {
    pub fn new(version: u32, iv: [u8; IV_SIZE], payload: Vec<u8>) -> Self {
        Self {
            version,
            reserved: 0,
            iv,
            payload,
        }
    }

    /// Split a raw CKC into its fields
    ///
    /// Any version number is accepted; callers decide what they understand.
    pub fn parse(bytes: &[u8]) -> Result<Self, FrameError> {
        let mut reader = FrameReader::new(bytes);
        let version = reader.u32("version")?;
        let reserved = reader.u32("reserved")?;
        let iv = reader.array("IV")?;
        let payload_length = reader.u32("payload length")? as usize;
        let payload = reader.bytes(payload_length, "payload")?;
        check_payload_length(payload.len())?;

        Ok(Self {
            version,
            reserved,
            iv,
            payload,
        })
    }
}

impl BinaryWrite for CkcFrame {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_u32_be(writer, self.version)?;
        write_u32_be(writer, self.reserved)?;
        write_bytes(writer, &self.iv)?;
        write_u32_be(writer, length_to_u32(self.payload.len())?)?;
        write_bytes(writer, &self.payload)
    }

    fn serialized_size(&self) -> usize {
        CKC_HEADER_SIZE + self.payload.len()
    }
}
