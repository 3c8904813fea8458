//! Big-endian binary helpers shared by the TLLV codec and the frame headers.
//!
//! Every multi-byte integer on the SPC/CKC wire is big-endian.

use std::io::{self, Read, Write};

pub mod traits;

pub use traits::{BinaryRead, BinaryWrite};

/// Read a u32 (big-endian) from a reader
pub fn read_u32_be<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Read a u64 (big-endian) from a reader
pub fn read_u64_be<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

/// Read a fixed-size array from a reader
pub fn read_array<R: Read, const N: usize>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read exactly n bytes from a reader
///
/// Fails without allocating when `n` exceeds `available`.
pub fn read_bytes<R: Read>(reader: &mut R, n: usize, available: usize) -> io::Result<Vec<u8>> {
    if n > available {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("need {} bytes, {} available", n, available),
        ));
    }
    let mut buf = vec![0u8; n];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Write a u32 (big-endian) to a writer
pub fn write_u32_be<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_be_bytes())
}

/// Write a u64 (big-endian) to a writer
pub fn write_u64_be<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_be_bytes())
}

/// Write bytes to a writer
pub fn write_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    writer.write_all(bytes)
}

/// Convert a length to its u32 wire form
pub fn length_to_u32(len: usize) -> io::Result<u32> {
    u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("length {} does not fit in u32", len),
        )
    })
}
