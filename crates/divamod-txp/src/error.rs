//! Error types for TXP texture handling.

use thiserror::Error;

/// Errors that can occur when reading or writing texture sets.
#[derive(Debug, Error)]
pub enum Error {
    /// Stream error from the underlying reader or writer.
    #[error("{0}")]
    Common(#[from] divamod_common::Error),

    /// Array slices of one texture disagree on their mip count.
    #[error("texture '{texture}': slice {slice} has {actual} mip levels, expected {expected}")]
    MismatchedMipLevels {
        texture: String,
        slice: usize,
        expected: usize,
        actual: usize,
    },

    /// Array size or mip count does not fit the one-byte header fields.
    #[error("texture '{texture}': {array_size} slices x {mip_levels} mip levels exceeds 255")]
    TooManyEntries {
        texture: String,
        array_size: usize,
        mip_levels: usize,
    },
}

/// Result type for TXP operations.
pub type Result<T> = std::result::Result<T, Error>;
