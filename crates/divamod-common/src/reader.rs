//! Binary reader for zero-copy parsing of pointer-based formats.
//!
//! This module provides [`BinaryReader`], a cursor over a byte slice that
//! resolves relative pointers against a stack of base offsets.

use byteorder::{ByteOrder, LittleEndian};

use crate::{Error, Result};

/// A binary reader over a byte slice with a base-offset stack.
///
/// Offsets read from the stream are relative to the innermost base frame
/// (or the start of the buffer when no frame is active). Pointer-chasing via
/// [`read_at_offset`](Self::read_at_offset) always restores the cursor, so
/// sibling fields can keep being read sequentially.
///
/// # Example
///
/// ```
/// use divamod_common::BinaryReader;
///
/// // A pointer at 0 to the u32 stored at 4.
/// let data = [0x04, 0x00, 0x00, 0x00, 0x2A, 0x00, 0x00, 0x00];
/// let mut reader = BinaryReader::new(&data);
///
/// let offset = reader.read_i32().unwrap() as usize;
/// let value = reader.read_at_offset(offset, false, |r| r.read_u32()).unwrap();
/// assert_eq!(value, 42);
/// assert_eq!(reader.position(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
    base_offsets: Vec<usize>,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            base_offsets: Vec::new(),
        }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// The base address relative offsets currently resolve against.
    #[inline]
    pub fn base_offset(&self) -> usize {
        self.base_offsets.last().copied().unwrap_or(0)
    }

    /// Push the current position as a new base frame.
    #[inline]
    pub fn push_base_offset(&mut self) {
        self.base_offsets.push(self.position);
    }

    /// Pop the innermost base frame.
    #[inline]
    pub fn pop_base_offset(&mut self) -> Option<usize> {
        self.base_offsets.pop()
    }

    /// Run `f` with the current position pushed as a base frame.
    ///
    /// The frame is popped again whether or not `f` succeeds.
    pub fn with_base_offset<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.push_base_offset();
        let result = f(self);
        self.pop_base_offset();
        result
    }

    /// Read a structure located at `offset` relative to the current base.
    ///
    /// The cursor is moved to the target, optionally a new base frame is
    /// established there, `f` is invoked, and the original cursor is
    /// restored afterwards. Errors from `f` are returned unchanged.
    pub fn read_at_offset<T>(
        &mut self,
        offset: usize,
        establish_base: bool,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let target = self.base_offset().saturating_add(offset);
        if target > self.data.len() {
            return Err(Error::InsufficientSpace {
                needed: target,
                available: self.data.len(),
            });
        }

        let return_position = self.position;
        self.position = target;

        let result = if establish_base {
            self.with_base_offset(f)
        } else {
            f(self)
        };

        self.position = return_position;
        result
    }

    /// Read an i32 pointer that must point forward.
    ///
    /// Returns [`Error::BadPointer`] for zero or negative offsets.
    pub fn read_forward_offset(&mut self) -> Result<usize> {
        let position = self.position;
        let offset = self.read_i32()?;
        if offset <= 0 {
            return Err(Error::BadPointer {
                offset: offset.into(),
                position,
            });
        }
        Ok(offset as usize)
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::InsufficientSpace {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    /// Read a little-endian i16.
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_bytes(2).map(LittleEndian::read_i16)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_bytes(4).map(LittleEndian::read_f32)
    }

    /// Read four consecutive little-endian f32 values.
    pub fn read_f32x4(&mut self) -> Result<[f32; 4]> {
        let mut values = [0.0f32; 4];
        LittleEndian::read_f32_into(self.read_bytes(16)?, &mut values);
        Ok(values)
    }

    /// Read a null-terminated string.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected, since
    /// legacy game data is not guaranteed to be UTF-8.
    pub fn read_cstring(&mut self) -> Result<String> {
        let remaining = self.remaining_bytes();

        let null_pos = memchr::memchr(0, remaining).ok_or(Error::InsufficientSpace {
            needed: remaining.len() + 1,
            available: remaining.len(),
        })?;

        let value = String::from_utf8_lossy(&remaining[..null_pos]).into_owned();
        self.position += null_pos + 1;
        Ok(value)
    }

    /// Read a string pointer and resolve it.
    ///
    /// A null (or negative) pointer yields an empty string.
    pub fn read_string_offset(&mut self) -> Result<String> {
        let offset = self.read_i32()?;
        if offset <= 0 {
            return Ok(String::new());
        }
        self.read_at_offset(offset as usize, false, |r| r.read_cstring())
    }

    /// Read a u32 signature and check it against `expected`.
    pub fn expect_signature(&mut self, expected: u32) -> Result<()> {
        let actual = self.read_u32()?;
        if actual != expected {
            return Err(Error::BadFormat { expected, actual });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // i32: -1
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_i32().unwrap(), -1);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_cstring() {
        let data = b"hello\0world\0";
        let mut reader = BinaryReader::new(data);

        assert_eq!(reader.read_cstring().unwrap(), "hello");
        assert_eq!(reader.read_cstring().unwrap(), "world");
    }

    #[test]
    fn test_cstring_without_terminator() {
        let mut reader = BinaryReader::new(b"abc");
        assert!(matches!(
            reader.read_cstring(),
            Err(Error::InsufficientSpace { .. })
        ));
    }

    #[test]
    fn test_read_at_offset_restores_cursor() {
        let data = [0x08, 0, 0, 0, 0x11, 0, 0, 0, 0x22, 0, 0, 0];
        let mut reader = BinaryReader::new(&data);

        let offset = reader.read_i32().unwrap() as usize;
        let pointed = reader.read_at_offset(offset, false, |r| r.read_u32()).unwrap();

        assert_eq!(pointed, 0x22);
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.read_u32().unwrap(), 0x11);
    }

    #[test]
    fn test_nested_base_offsets() {
        // Frame at 4 holds a pointer (4) relative to itself, landing on 8.
        let data = [0, 0, 0, 0, 0x04, 0, 0, 0, 0x99, 0, 0, 0];
        let mut reader = BinaryReader::new(&data);

        let value = reader
            .read_at_offset(4, true, |r| {
                assert_eq!(r.base_offset(), 4);
                let inner = r.read_i32()? as usize;
                r.read_at_offset(inner, false, |r| r.read_u32())
            })
            .unwrap();

        assert_eq!(value, 0x99);
        assert_eq!(reader.base_offset(), 0);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_error_propagates_and_frame_is_popped() {
        let data = [0u8; 8];
        let mut reader = BinaryReader::new(&data);

        let result = reader.read_at_offset(4, true, |r| r.expect_signature(0x1234));
        assert!(matches!(result, Err(Error::BadFormat { expected: 0x1234, actual: 0 })));
        assert_eq!(reader.base_offset(), 0);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_forward_offset_rejects_null() {
        let data = [0u8; 4];
        let mut reader = BinaryReader::new(&data);
        assert!(matches!(
            reader.read_forward_offset(),
            Err(Error::BadPointer { offset: 0, position: 0 })
        ));
    }

    #[test]
    fn test_null_string_offset_is_empty() {
        let data = [0u8; 4];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_string_offset().unwrap(), "");
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(reader.read_u32().is_err());
    }
}
