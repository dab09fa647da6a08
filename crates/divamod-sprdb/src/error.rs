//! Error types for sprite database handling.

use thiserror::Error;

/// Errors that can occur when reading or writing a sprite database.
#[derive(Debug, Error)]
pub enum Error {
    /// Stream error from the underlying reader or writer.
    #[error("{0}")]
    Common(#[from] divamod_common::Error),

    /// A data index does not fit the 16-bit entry field.
    #[error("entry '{name}': data index {index} does not fit in 16 bits")]
    IndexOverflow { name: String, index: i32 },

    /// More sets than the 12-bit set index can address.
    #[error("{0} sprite sets exceed the addressable maximum of 4096")]
    TooManySets(usize),

    /// An entry refers to a set that is not in the database.
    #[error("entry '{name}' refers to set {set_index}, but only {set_count} sets exist")]
    SetIndexOutOfRange {
        name: String,
        set_index: usize,
        set_count: usize,
    },
}

/// Result type for sprite database operations.
pub type Result<T> = std::result::Result<T, Error>;
