//! On-disk archive header.

use zerocopy::byteorder::{BigEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Fixed archive header. All fields are big-endian.
///
/// `header_size` counts the bytes following the field itself, up to the end
/// of the entry table.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct FArcHeader {
    pub signature: [u8; 4],
    pub header_size: U32<BigEndian>,
    pub alignment: U32<BigEndian>,
}

impl FArcHeader {
    /// Uncompressed archive.
    pub const UNCOMPRESSED: [u8; 4] = *b"FArc";
    /// Gzip-compressed archive.
    pub const COMPRESSED: [u8; 4] = *b"FArC";
    /// Extended (possibly encrypted) archive.
    pub const EXTENDED: [u8; 4] = *b"FARC";

    /// Byte size of the header.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(compressed: bool, header_size: u32, alignment: u32) -> Self {
        Self {
            signature: if compressed {
                Self::COMPRESSED
            } else {
                Self::UNCOMPRESSED
            },
            header_size: U32::new(header_size),
            alignment: U32::new(alignment),
        }
    }

    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.signature == Self::COMPRESSED
    }
}
