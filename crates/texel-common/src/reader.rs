//! Cursor for pulling fixed-layout headers out of container files.

use zerocopy::FromBytes;

use crate::{Error, Result};

/// Reads magic numbers and `zerocopy` structs from the front of a buffer.
///
/// # Example
///
/// ```
/// use texel_common::BinaryReader;
///
/// let mut reader = BinaryReader::new(b"DDS \x7c\x00\x00\x00rest");
/// reader.expect_magic(b"DDS ")?;
/// let size: u32 = reader.read_struct()?;
/// assert_eq!(size, 124);
/// assert_eq!(reader.rest(), b"rest");
/// # Ok::<(), texel_common::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Consume `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let rest = self.rest();
        if rest.len() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: rest.len(),
            });
        }
        self.position += count;
        Ok(&rest[..count])
    }

    /// Consume a little-endian `T`.
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }

    /// Consume `expected.len()` bytes and fail unless they equal `expected`.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        Ok(())
    }
}
