//! SprSet sprite container codec.
//!
//! A sprite set bundles a TXP texture set with the rectangular sprites cut
//! from its textures. All pointers in the header are absolute.
//!
//! # Layout
//!
//! ```text
//! 0x00  flags
//! 0x04  tex_set_offset          (written last, patched)
//! 0x08  texture_count
//! 0x0C  sprite_count
//! 0x10  sprites_offset          -> [texture_index rotate texel[4] pixel[4]; sprite_count]
//! 0x14  texture_names_offset    -> [string_offset; texture_count]
//! 0x18  sprite_names_offset     -> [string_offset; sprite_count]
//! 0x1C  sprite_extra_offset     -> [flags screen_mode; sprite_count]
//! ```
//!
//! # Example
//!
//! ```
//! use divamod_spr::{ScreenMode, SprSet, Sprite, SpriteExtra};
//!
//! let mut set = SprSet::new();
//! set.sprites.push(Sprite {
//!     name: "LOGO".into(),
//!     extra: SpriteExtra { flags: 0, screen_mode: ScreenMode::HDTV1080 },
//!     ..Default::default()
//! });
//!
//! // No textures yet, so validation rejects the sprite's index 0.
//! assert!(set.to_bytes().is_err());
//! ```

mod error;
mod screen_mode;
mod spr_set;
mod sprite;

pub use error::{Error, Result};
pub use screen_mode::ScreenMode;
pub use spr_set::SprSet;
pub use sprite::{Sprite, SpriteExtra};
