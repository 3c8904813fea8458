//! TLLV (tag, block length, value length, value) records
//!
//! ```text
//! ┌──────────┬──────────────┬──────────────┬──────────────────────────────┐
//! │ tag (8)  │ block len (4)│ value len (4)│ value ‖ padding (block len)  │
//! └──────────┴──────────────┴──────────────┴──────────────────────────────┘
//! ```
//!
//! Record streams are encrypted in place with a 16-byte block cipher, so every
//! `block_length` is a multiple of 16. Only the first `value_length` bytes of
//! the block are meaningful; the rest is filler and never trusted.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Cursor, Read, Write};

use thiserror::Error;
use zeroize::Zeroize;

use crate::binary::{
    length_to_u32, read_u32_be, read_u64_be, write_bytes, write_u32_be, write_u64_be, BinaryRead,
    BinaryWrite,
};
use crate::tag::Tag;

/// Cipher block size every `block_length` must be aligned to
pub const TLLV_ALIGNMENT: usize = 16;

/// Size of the fixed record header
pub const TLLV_HEADER_SIZE: usize = 16;

/// TLLV codec errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TllvError {
    #[error("Malformed TLLV at offset {offset}: {reason}")]
    MalformedTllv { offset: usize, reason: String },

    #[error("Invalid record length for tag {tag}: {reason}")]
    InvalidRecordLength { tag: Tag, reason: String },
}

/// A single TLLV record
///
/// Equality compares tag, block length and the meaningful value; padding is
/// ignored.
#[derive(Clone, Zeroize)]
pub struct TllvRecord {
    #[zeroize(skip)]
    tag: Tag,
    block_length: u32,
    value: Vec<u8>,
    padding: Vec<u8>,
}

impl TllvRecord {
    /// Assemble a record from its parts
    ///
    /// Nothing is checked here; [`encode_records`] rejects inconsistent lengths.
    pub fn new(tag: Tag, block_length: u32, value: Vec<u8>, padding: Vec<u8>) -> Self {
        Self {
            tag,
            block_length,
            value,
            padding,
        }
    }

    /// Build a record whose block is exactly `value ‖ padding`
    pub fn with_padding(tag: Tag, value: Vec<u8>, padding: Vec<u8>) -> Result<Self, TllvError> {
        let block_length = length_to_u32(value.len() + padding.len()).map_err(|e| {
            TllvError::InvalidRecordLength {
                tag,
                reason: e.to_string(),
            }
        })?;
        Ok(Self::new(tag, block_length, value, padding))
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn block_length(&self) -> u32 {
        self.block_length
    }

    /// Length of the meaningful value
    pub fn value_length(&self) -> usize {
        self.value.len()
    }

    /// The meaningful value bytes
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn padding(&self) -> &[u8] {
        &self.padding
    }

    /// Check the lengths the encoder relies on
    pub fn validate(&self) -> Result<(), TllvError> {
        let invalid = |reason: String| TllvError::InvalidRecordLength {
            tag: self.tag,
            reason,
        };

        if self.block_length as usize % TLLV_ALIGNMENT != 0 {
            return Err(invalid(format!(
                "block length {} is not a multiple of {}",
                self.block_length, TLLV_ALIGNMENT
            )));
        }
        if self.value.len() > self.block_length as usize {
            return Err(invalid(format!(
                "value length {} exceeds block length {}",
                self.value.len(),
                self.block_length
            )));
        }
        if self.value.len() + self.padding.len() != self.block_length as usize {
            return Err(invalid(format!(
                "value ({}) plus padding ({}) does not fill block length {}",
                self.value.len(),
                self.padding.len(),
                self.block_length
            )));
        }
        Ok(())
    }
}

impl PartialEq for TllvRecord {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.block_length == other.block_length && self.value == other.value
    }
}

impl Eq for TllvRecord {}

impl fmt::Debug for TllvRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TllvRecord")
            .field("tag", &self.tag)
            .field("name", &self.tag.name())
            .field("block_length", &self.block_length)
            .field("value_length", &self.value.len())
            .finish()
    }
}

impl BinaryRead for TllvRecord {
    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let tag = Tag(read_u64_be(reader)?);
        let block_length = read_u32_be(reader)?;
        let value_length = read_u32_be(reader)?;

        if value_length > block_length {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "tag {}: value length {} exceeds block length {}",
                    tag, value_length, block_length
                ),
            ));
        }

        // allocation follows the input, not block_length
        let mut block = Vec::new();
        reader
            .take(u64::from(block_length))
            .read_to_end(&mut block)?;
        if block.len() != block_length as usize {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "tag {}: declared block length {} but only {} bytes remain",
                    tag,
                    block_length,
                    block.len()
                ),
            ));
        }

        let padding = block.split_off(value_length as usize);
        Ok(Self {
            tag,
            block_length,
            value: block,
            padding,
        })
    }
}

impl BinaryWrite for TllvRecord {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_u64_be(writer, self.tag.0)?;
        write_u32_be(writer, self.block_length)?;
        write_u32_be(writer, length_to_u32(self.value.len())?)?;
        write_bytes(writer, &self.value)?;
        write_bytes(writer, &self.padding)
    }

    fn serialized_size(&self) -> usize {
        TLLV_HEADER_SIZE + self.value.len() + self.padding.len()
    }
}

/// Decode a record stream until the input is exhausted
pub fn decode_records(bytes: &[u8]) -> Result<Vec<TllvRecord>, TllvError> {
    let mut cursor = Cursor::new(bytes);
    let mut records = Vec::new();

    while (cursor.position() as usize) < bytes.len() {
        let offset = cursor.position() as usize;
        let record =
            TllvRecord::read_from(&mut cursor).map_err(|e| TllvError::MalformedTllv {
                offset,
                reason: e.to_string(),
            })?;
        records.push(record);
    }

    Ok(records)
}

/// Encode records in order
///
/// The caller pads; this only validates that each record is consistent.
pub fn encode_records(records: &[TllvRecord]) -> Result<Vec<u8>, TllvError> {
    for record in records {
        record.validate()?;
    }

    let size = records.iter().map(BinaryWrite::serialized_size).sum();
    let mut out = Vec::with_capacity(size);
    for record in records {
        record
            .write_to(&mut out)
            .map_err(|e| TllvError::InvalidRecordLength {
                tag: record.tag,
                reason: e.to_string(),
            })?;
    }
    Ok(out)
}

/// Position of the last record carrying each tag
pub fn index_by_tag(records: &[TllvRecord]) -> HashMap<Tag, usize> {
    records
        .iter()
        .enumerate()
        .map(|(position, record)| (record.tag, position))
        .collect()
}

/// First tag that appears more than once, in wire order
pub fn first_duplicate(records: &[TllvRecord]) -> Option<Tag> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .map(TllvRecord::tag)
        .find(|tag| !seen.insert(*tag))
}
