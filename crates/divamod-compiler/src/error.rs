//! Error types for the sprite compiler.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while compiling sprite data.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sprite image could not be decoded.
    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// `spr_info.json` is malformed.
    #[error("failed to parse manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file is malformed.
    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Sprite set encoding or decoding error.
    #[error("sprite set: {0}")]
    Spr(#[from] divamod_spr::Error),

    /// Sprite database encoding or decoding error.
    #[error("sprite database: {0}")]
    SprDb(#[from] divamod_sprdb::Error),

    /// Archive error.
    #[error("archive: {0}")]
    FArc(#[from] divamod_farc::Error),

    /// Every sprite id up to `u32::MAX` has been handed out.
    #[error("sprite ids exhausted")]
    IdsExhausted,

    /// The mods directory does not exist.
    #[error("mods directory not found: {0}")]
    ModsDirectoryNotFound(PathBuf),
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
