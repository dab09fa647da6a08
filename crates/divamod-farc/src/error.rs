//! Error types for the FArc crate.

use thiserror::Error;

/// Errors that can occur when working with FArc archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Signature is not one of the supported archive kinds.
    #[error("unsupported archive signature {0:?}")]
    UnsupportedSignature(String),

    /// The header ended in the middle of an entry.
    #[error("truncated archive header at byte {0}")]
    TruncatedHeader(usize),

    /// An entry's data lies outside the archive.
    #[error("entry '{name}' spans {offset}..{end}, past the end of the archive ({len} bytes)")]
    EntryOutOfBounds {
        name: String,
        offset: usize,
        end: usize,
        len: usize,
    },

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),
}

/// Result type for FArc operations.
pub type Result<T> = std::result::Result<T, Error>;
