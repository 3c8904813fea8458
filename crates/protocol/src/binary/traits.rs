//! Traits for reading and writing wire structures

use std::io::{self, Read, Write};

/// Types that can be read from their wire form
pub trait BinaryRead: Sized {
    /// Read this type from a binary reader
    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self>;
}

/// Types that can be written in their wire form
pub trait BinaryWrite {
    /// Write this type to a binary writer
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()>;

    /// Size in bytes when serialized
    fn serialized_size(&self) -> usize;

    /// Serialize into a fresh buffer
    fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.serialized_size());
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

/// Types that support both reading and writing
pub trait BinarySerialize: BinaryRead + BinaryWrite {}

impl<T: BinaryRead + BinaryWrite> BinarySerialize for T {}
