//! Common utilities for divamod.
//!
//! This crate provides the byte-level plumbing shared by every divamod format crate:
//!
//! - [`BinaryReader`] - Zero-copy reading with a stack of base offsets for relative pointers
//! - [`BinaryWriter`] - Little-endian writing with deferred, pointer-patched sub-blocks
//! - [`Error`] - The closed stream error taxonomy used by all decoders

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;

/// Round `value` up to the next multiple of `alignment`.
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    if alignment == 0 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}
