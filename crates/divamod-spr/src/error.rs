//! Error types for sprite set handling.

use thiserror::Error;

/// Errors that can occur when reading or writing sprite sets.
#[derive(Debug, Error)]
pub enum Error {
    /// Stream error from the underlying reader or writer.
    #[error("{0}")]
    Common(#[from] divamod_common::Error),

    /// Error from the embedded texture set.
    #[error("texture set: {0}")]
    Txp(#[from] divamod_txp::Error),

    /// A sprite references a texture the set does not contain.
    #[error("sprite '{sprite}' references texture {index}, but the set has {texture_count}")]
    TextureIndexOutOfRange {
        sprite: String,
        index: i32,
        texture_count: usize,
    },
}

/// Result type for sprite set operations.
pub type Result<T> = std::result::Result<T, Error>;
