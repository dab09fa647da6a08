//! Sprite compiler for Project DIVA mods.
//!
//! Reads `spr_info.json` manifests from every mod, packs the listed images
//! into sprite sets, registers them in a sprite database and splices in the
//! base game's data for sets that already exist.
//!
//! # Layout
//!
//! ```text
//! mods_102/
//!   <mod>/rom_src/2d/spr_info.json     manifest + images
//!   <mod>/rom/2d/<set>.farc            one archive per set
//!   <mod>/rom/2d/mod_spr_db.bin        database of the mod's sets
//!   AAA - MERGER PRIORITY/rom/2d/      cumulative sets of all mods
//! ```
//!
//! # Example
//!
//! ```no_run
//! use divamod_compiler::{Compiler, CompilerConfig};
//!
//! let config = CompilerConfig::load("divamod.toml")?;
//! let mut compiler = Compiler::new(config);
//! compiler.compile_all()?;
//! # Ok::<(), divamod_compiler::Error>(())
//! ```

mod compile;
mod config;
mod error;
mod ids;
mod manifest;
mod merge;
mod packer;
mod register;

pub use compile::{CompileReport, Compiler, MOD_DATABASE_FILE_NAME};
pub use config::{CompilerConfig, FArcSettings, DEFAULT_FIRST_SPRITE_ID};
pub use error::{Error, Result};
pub use ids::IdAllocator;
pub use manifest::{
    coalesce_sets, SpriteManifest, SpriteSetSource, SpriteSource, MANIFEST_FILE_NAME,
};
pub use merge::{
    base_set_path, merge_base, merge_sets, texture_name_with_index, BASE_DATABASE_FILE_NAME,
};
pub use packer::{markup_flags, PackSettings, ShelfPacker, SprMarkup, SpritePacker};
pub use register::{register_set, sprite_index, texture_entry_name};
