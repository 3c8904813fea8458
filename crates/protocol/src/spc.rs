//! SPC outer frame
//!
//! ```text
//! version (4) │ reserved (4) │ session IV (16) │ wrapped key (128 | 256)
//!             │ certificate hash (20) │ payload length (4) │ payload
//! ```
//!
//! Version 1 carries a key wrapped under RSA-1024, version 2 under RSA-2048.

use std::io::{self, Write};

use crate::binary::{length_to_u32, write_bytes, write_u32_be, BinaryWrite};
use crate::frame::{check_payload_length, FrameError, FrameReader, IV_SIZE};

/// SHA-1 digest of the server certificate
pub const CERTIFICATE_HASH_SIZE: usize = 20;

/// Supported SPC frame versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpcVersion {
    V1 = 1,
    V2 = 2,
}

impl SpcVersion {
    pub fn from_u32(version: u32) -> Option<Self> {
        match version {
            1 => Some(SpcVersion::V1),
            2 => Some(SpcVersion::V2),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Size of the RSA-wrapped session key for this version
    pub fn wrapped_key_size(self) -> usize {
        match self {
            SpcVersion::V1 => 128,
            SpcVersion::V2 => 256,
        }
    }

    /// Bytes before the payload
    pub fn header_size(self) -> usize {
        4 + 4 + IV_SIZE + self.wrapped_key_size() + CERTIFICATE_HASH_SIZE + 4
    }
}

/// A framed but still encrypted SPC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpcFrame {
    pub version: SpcVersion,
    pub reserved: u32,
    pub session_iv: [u8; IV_SIZE],
    pub encrypted_session_key: Vec<u8>,
    pub certificate_hash: [u8; CERTIFICATE_HASH_SIZE],
    pub payload: Vec<u8>,
}

impl SpcFrame {
    /// Split a raw SPC into its fields
    ///
    /// Returns the frame and the number of trailing bytes after the payload.
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), FrameError> {
        let mut reader = FrameReader::new(bytes);

        let raw_version = reader.u32("version")?;
        let version =
            SpcVersion::from_u32(raw_version).ok_or(FrameError::UnknownVersion(raw_version))?;

        let reserved = reader.u32("reserved")?;
        let session_iv = reader.array("session IV")?;
        let encrypted_session_key =
            reader.bytes(version.wrapped_key_size(), "encrypted session key")?;
        let certificate_hash = reader.array("certificate hash")?;
        let payload_length = reader.u32("payload length")? as usize;
        let payload = reader.bytes(payload_length, "payload")?;
        check_payload_length(payload.len())?;

        let frame = Self {
            version,
            reserved,
            session_iv,
            encrypted_session_key,
            certificate_hash,
            payload,
        };
        Ok((frame, reader.remaining()))
    }
}

impl BinaryWrite for SpcFrame {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.encrypted_session_key.len() != self.version.wrapped_key_size() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "version {} expects a {}-byte wrapped key, got {}",
                    self.version.as_u32(),
                    self.version.wrapped_key_size(),
                    self.encrypted_session_key.len()
                ),
            ));
        }
        write_u32_be(writer, self.version.as_u32())?;
        write_u32_be(writer, self.reserved)?;
        write_bytes(writer, &self.session_iv)?;
        write_bytes(writer, &self.encrypted_session_key)?;
        write_bytes(writer, &self.certificate_hash)?;
        write_u32_be(writer, length_to_u32(self.payload.len())?)?;
        write_bytes(writer, &self.payload)
    }

    fn serialized_size(&self) -> usize {
        self.version.header_size() + self.payload.len()
    }
}
