//! Little-endian writer with deferred, pointer-patched sub-blocks.
//!
//! Variable-sized bodies are not written where they are referenced. Instead
//! a 4-byte pointer slot is reserved and the body is queued; a later flush
//! pass appends each body and back-patches its slot.

use std::collections::VecDeque;
use std::hash::BuildHasherDefault;

use byteorder::{ByteOrder, LittleEndian};
use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;

use crate::{Error, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// A deferred body writer.
pub type WriteBody<'a> = Box<dyn FnOnce(&mut BinaryWriter<'a>) + 'a>;

/// A body waiting for the next flush.
struct ScheduledWrite<'a> {
    slot: usize,
    base: usize,
    body: WriteBody<'a>,
}

/// A string pointer waiting for the string flush.
#[derive(Debug)]
struct ScheduledString<'a> {
    slot: usize,
    value: &'a str,
}

/// An append-only little-endian writer with scheduled writes.
///
/// Bodies borrowed for `'a` can be scheduled with
/// [`schedule_write_offset`](Self::schedule_write_offset) and are laid out
/// breadth-first by [`flush_scheduled_writes`](Self::flush_scheduled_writes).
///
/// # Example
///
/// ```
/// use divamod_common::{BinaryReader, BinaryWriter};
///
/// let payload = [7u32, 8, 9];
/// let mut writer = BinaryWriter::new();
/// writer.write_u32(payload.len() as u32);
/// writer.schedule_write_offset(0, |w| {
///     for value in &payload {
///         w.write_u32(*value);
///     }
/// });
/// writer.flush_scheduled_writes();
/// let bytes = writer.finish().unwrap();
///
/// let mut reader = BinaryReader::new(&bytes);
/// assert_eq!(reader.read_u32().unwrap(), 3);
/// let offset = reader.read_forward_offset().unwrap();
/// assert_eq!(reader.read_at_offset(offset, false, |r| r.read_u32()).unwrap(), 7);
/// ```
pub struct BinaryWriter<'a> {
    buffer: Vec<u8>,
    scheduled: VecDeque<ScheduledWrite<'a>>,
    strings: Vec<ScheduledString<'a>>,
}

impl<'a> BinaryWriter<'a> {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            scheduled: VecDeque::new(),
            strings: Vec::new(),
        }
    }

    /// Current write position (always the end of the buffer).
    #[inline]
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes written so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of bodies and strings still waiting to be flushed.
    #[inline]
    pub fn pending(&self) -> usize {
        self.scheduled.len() + self.strings.len()
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Write a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Write a little-endian u16.
    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.write_scalar::<2>(|b| LittleEndian::write_u16(b, value));
    }

    /// Write a little-endian i16.
    #[inline]
    pub fn write_i16(&mut self, value: i16) {
        self.write_scalar::<2>(|b| LittleEndian::write_i16(b, value));
    }

    /// Write a little-endian u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.write_scalar::<4>(|b| LittleEndian::write_u32(b, value));
    }

    /// Write a little-endian i32.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.write_scalar::<4>(|b| LittleEndian::write_i32(b, value));
    }

    /// Write a little-endian f32.
    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.write_scalar::<4>(|b| LittleEndian::write_f32(b, value));
    }

    /// Write four consecutive little-endian f32 values.
    pub fn write_f32x4(&mut self, values: &[f32; 4]) {
        self.write_scalar::<16>(|b| LittleEndian::write_f32_into(values, b));
    }

    /// Write a string followed by a null terminator.
    pub fn write_cstring(&mut self, value: &str) {
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.push(0);
    }

    /// Write zero bytes up to the next multiple of `alignment`.
    pub fn pad(&mut self, alignment: usize) {
        let aligned = crate::align_up(self.position(), alignment);
        self.buffer.resize(aligned, 0);
    }

    /// Reserve a zeroed 4-byte slot and return its address.
    pub fn reserve_u32(&mut self) -> usize {
        let slot = self.position();
        self.write_u32(0);
        slot
    }

    /// Overwrite a previously reserved 4-byte slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot` does not refer to four already written bytes.
    pub fn patch_i32(&mut self, slot: usize, value: i32) {
        LittleEndian::write_i32(&mut self.buffer[slot..slot + 4], value);
    }

    /// Reserve a pointer slot now and write `body` during the next flush.
    ///
    /// Once the body lands at address `A`, the slot receives `A - base`.
    pub fn schedule_write_offset(
        &mut self,
        base: usize,
        body: impl FnOnce(&mut BinaryWriter<'a>) + 'a,
    ) {
        let slot = self.reserve_u32();
        self.scheduled.push_back(ScheduledWrite {
            slot,
            base,
            body: Box::new(body),
        });
    }

    /// Reserve an absolute string pointer slot for the string flush.
    pub fn schedule_write_string_offset(&mut self, value: &'a str) {
        let slot = self.reserve_u32();
        self.strings.push(ScheduledString { slot, value });
    }

    /// Write every scheduled body, including bodies scheduled by bodies.
    ///
    /// The queue is drained first-in first-out, so siblings at the same
    /// nesting depth end up contiguous and the recursion depth stays flat.
    pub fn flush_scheduled_writes(&mut self) {
        while let Some(entry) = self.scheduled.pop_front() {
            let address = self.position();
            self.patch_i32(entry.slot, relative_offset(address, entry.base));
            (entry.body)(self);
        }
    }

    /// Write every scheduled string, pooling equal values.
    pub fn flush_scheduled_strings(&mut self) {
        let mut pool: FxHashMap<&'a str, usize> = FxHashMap::default();

        for entry in std::mem::take(&mut self.strings) {
            let address = match pool.get(entry.value) {
                Some(&address) => address,
                None => {
                    let address = self.position();
                    self.write_cstring(entry.value);
                    pool.insert(entry.value, address);
                    address
                }
            };
            self.patch_i32(entry.slot, relative_offset(address, 0));
        }
    }

    /// Finalize the writer and return the buffer.
    ///
    /// Fails if any scheduled body or string was never flushed, because the
    /// corresponding pointer slots would still be zero.
    pub fn finish(self) -> Result<Vec<u8>> {
        let pending = self.pending();
        if pending > 0 {
            return Err(Error::UnflushedWrites { pending });
        }
        Ok(self.buffer)
    }

    #[inline]
    fn write_scalar<const N: usize>(&mut self, encode: impl FnOnce(&mut [u8])) {
        let mut bytes = [0u8; N];
        encode(&mut bytes);
        self.buffer.extend_from_slice(&bytes);
    }
}

impl Default for BinaryWriter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BinaryWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryWriter")
            .field("position", &self.position())
            .field("scheduled", &self.scheduled.len())
            .field("strings", &self.strings.len())
            .finish()
    }
}

fn relative_offset(address: usize, base: usize) -> i32 {
    (address as i64 - base as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BinaryReader;

    #[test]
    fn test_scalars_are_little_endian() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0x04030201);
        writer.write_i16(-2);
        writer.write_u8(0xAB);

        assert_eq!(writer.as_bytes(), &[0x01, 0x02, 0x03, 0x04, 0xFE, 0xFF, 0xAB]);
    }

    #[test]
    fn test_pad_to_alignment() {
        let mut writer = BinaryWriter::new();
        writer.write_u8(1);
        writer.pad(16);
        assert_eq!(writer.position(), 16);

        // Already aligned: no-op.
        writer.pad(16);
        assert_eq!(writer.position(), 16);
        assert!(writer.as_bytes()[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_scheduled_offset_is_relative_to_base() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0xDEAD);
        let base = writer.position();
        writer.schedule_write_offset(base, |w| w.write_u32(0xBEEF));
        writer.flush_scheduled_writes();
        let bytes = writer.finish().unwrap();

        // Slot at 4, body at 8, relative to 4.
        assert_eq!(LittleEndian::read_i32(&bytes[4..8]), 4);
        assert_eq!(LittleEndian::read_u32(&bytes[8..12]), 0xBEEF);
    }

    #[test]
    fn test_flush_is_breadth_first() {
        let mut writer = BinaryWriter::new();
        for outer in 0..2u8 {
            writer.schedule_write_offset(0, move |w| {
                w.write_u8(outer);
                w.schedule_write_offset(0, move |w| w.write_u8(0x10 + outer));
            });
        }
        writer.flush_scheduled_writes();
        let bytes = writer.finish().unwrap();

        // Header: two slots. Depth 1: [0, slot, 1, slot]. Depth 2: [0x10, 0x11].
        assert_eq!(bytes.len(), 8 + 10 + 2);
        assert_eq!(bytes[8], 0);
        assert_eq!(bytes[13], 1);
        assert_eq!(&bytes[18..], &[0x10, 0x11]);

        let mut reader = BinaryReader::new(&bytes);
        for outer in 0..2u8 {
            let offset = reader.read_forward_offset().unwrap();
            let inner = reader
                .read_at_offset(offset, false, |r| {
                    assert_eq!(r.read_u8()?, outer);
                    let inner = r.read_forward_offset()?;
                    r.read_at_offset(inner, false, |r| r.read_u8())
                })
                .unwrap();
            assert_eq!(inner, 0x10 + outer);
        }
    }

    #[test]
    fn test_strings_are_pooled() {
        let names = ["alpha", "beta", "alpha"];
        let mut writer = BinaryWriter::new();
        for name in &names {
            writer.schedule_write_string_offset(name);
        }
        writer.flush_scheduled_strings();
        let bytes = writer.finish().unwrap();

        assert_eq!(bytes.len(), 12 + "alpha\0beta\0".len());
        assert_eq!(&bytes[0..4], &bytes[8..12]);

        let mut reader = BinaryReader::new(&bytes);
        for name in &names {
            assert_eq!(reader.read_string_offset().unwrap(), *name);
        }
    }

    #[test]
    fn test_finish_rejects_pending_writes() {
        let mut writer = BinaryWriter::new();
        writer.schedule_write_offset(0, |w| w.write_u8(1));
        writer.schedule_write_string_offset("left behind");

        assert!(matches!(
            writer.finish(),
            Err(Error::UnflushedWrites { pending: 2 })
        ));
    }
}
