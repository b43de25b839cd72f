use bytes::Bytes;

use crate::error::ParseError;

use super::endian::ByteOrder;

/// Forward-only reader over an in-memory file buffer.
///
/// Slices returned by [`ByteCursor::take`] share the underlying allocation,
/// so element values are never copied while parsing.
#[derive(Debug, Clone)]
pub struct ByteCursor {
    data: Bytes,
    position: usize,
}

impl ByteCursor {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: Bytes) -> Self {
        Self { data, position: 0 }
    }

    /// Current offset from the start of the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left after the current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next `len` bytes without consuming them.
    pub fn peek(&self, len: usize) -> Option<&[u8]> {
        if self.remaining() < len {
            return None;
        }
        Some(&self.data[self.position..self.position + len])
    }

    /// Consume exactly `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<Bytes, ParseError> {
        self.ensure(len)?;
        let value = self.data.slice(self.position..self.position + len);
        self.position += len;
        Ok(value)
    }

    /// Skip exactly `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<(), ParseError> {
        self.ensure(len)?;
        self.position += len;
        Ok(())
    }

    pub fn read_u16(&mut self, order: ByteOrder) -> Result<u16, ParseError> {
        self.ensure(2)?;
        let value = order.read_u16(&self.data[self.position..]);
        self.position += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self, order: ByteOrder) -> Result<u32, ParseError> {
        self.ensure(4)?;
        let value = order.read_u32(&self.data[self.position..]);
        self.position += 4;
        Ok(value)
    }

    fn ensure(&self, needed: usize) -> Result<(), ParseError> {
        if self.remaining() < needed {
            return Err(ParseError::UnexpectedEof {
                offset: self.position,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }
}
