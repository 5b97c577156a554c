//! Little-endian byte reader with cursor tracking.

use crate::BufferError;

/// A bounds-checked reader over a byte slice.
///
/// Every read either consumes exactly the requested number of bytes or
/// fails with [`BufferError::EndOfBuffer`] and leaves the cursor untouched.
///
/// # Example
///
/// ```
/// use mrmeta_buffers::Reader;
///
/// let data = [0x01, 0x00, 0x00, 0x00, 0xff];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u32_le().unwrap(), 1);
/// assert_eq!(reader.buf(1).unwrap(), &[0xff]);
/// assert!(reader.skip(1).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    data: &'a [u8],
    x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, x: 0 }
    }

    /// Current cursor offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.x
    }

    /// Number of bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.x)
    }

    fn ensure(&self, needed: usize) -> Result<(), BufferError> {
        if self.remaining() < needed {
            return Err(BufferError::EndOfBuffer {
                offset: self.x,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Advances the cursor by `length` bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.ensure(length)?;
        self.x += length;
        Ok(())
    }

    /// Returns the next `size` bytes and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.ensure(size)?;
        let start = self.x;
        self.x += size;
        Ok(&self.data[start..self.x])
    }

    /// Reads a fixed-size array, e.g. a magic number or a padded name.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.buf(N)?);
        Ok(out)
    }

    /// Reads an unsigned 32-bit integer (little-endian).
    #[inline]
    pub fn u32_le(&mut self) -> Result<u32, BufferError> {
        self.array().map(u32::from_le_bytes)
    }
}
