//! Divamod - Project DIVA mod sprite tooling.
//!
//! This crate provides a unified interface to the divamod library ecosystem.
//!
//! # Crates
//!
//! - [`divamod_common`] - Binary reader and offset-patching writer
//! - [`divamod_txp`] - TXP texture set codec
//! - [`divamod_spr`] - SprSet sprite container codec
//! - [`divamod_sprdb`] - Sprite database (`spr_db.bin`) codec
//! - [`divamod_farc`] - FArc archive packing and reading
//! - [`divamod_compiler`] - Manifest driven sprite compiler
//!
//! # Example
//!
//! ```no_run
//! use divamod::prelude::*;
//!
//! // Look inside a compiled sprite archive
//! let farc = FArc::open("mods_102/my_mod/rom/2d/spr_sel_pv900.farc")?;
//! let set = SprSet::from_bytes(&farc.read_file("spr_sel_pv900.bin")?)?;
//! for sprite in &set.sprites {
//!     println!("{} -> texture {}", sprite.name, sprite.texture_index);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use divamod_common as common;
pub use divamod_compiler as compiler;
pub use divamod_farc as farc;
pub use divamod_spr as spr;
pub use divamod_sprdb as sprdb;
pub use divamod_txp as txp;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use divamod_common::{BinaryReader, BinaryWriter};
    pub use divamod_compiler::{CompileReport, Compiler, CompilerConfig, SpriteManifest};
    pub use divamod_farc::{FArc, FArcPacker};
    pub use divamod_spr::{ScreenMode, SprSet, Sprite};
    pub use divamod_sprdb::{SpriteDataInfo, SpriteDatabase, SpriteSetInfo};
    pub use divamod_txp::{MipMap, Tex, TexSet, TextureFormat};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
