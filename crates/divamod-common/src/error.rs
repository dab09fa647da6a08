//! Error types for divamod-common.

use thiserror::Error;

/// Stream error taxonomy shared by all divamod decoders and encoders.
#[derive(Debug, Error)]
pub enum Error {
    /// A signature did not match the expected structure type.
    #[error("bad format: expected signature {expected:#010x}, got {actual:#010x}")]
    BadFormat { expected: u32, actual: u32 },

    /// A declared size exceeds the bytes left in the stream.
    #[error("bad count: declared {count} bytes but only {remaining} remain")]
    BadCount { count: usize, remaining: usize },

    /// An offset that must be a forward pointer was zero or negative.
    #[error("bad pointer: offset {offset} at {position:#x} is not a valid forward pointer")]
    BadPointer { offset: i64, position: usize },

    /// Read past the end of the buffer.
    #[error("insufficient space: needed {needed} bytes but only {available} available")]
    InsufficientSpace { needed: usize, available: usize },

    /// Anything else that went wrong while streaming.
    #[error("unknown stream error: {0}")]
    UnknownError(String),

    /// The writer was finalized with bodies or strings still queued.
    #[error("{pending} scheduled writes were never flushed")]
    UnflushedWrites { pending: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
