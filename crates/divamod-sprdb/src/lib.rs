//! Sprite database (`spr_db.bin`) codec.
//!
//! The database maps sprite and texture names to globally unique ids and to
//! their positions inside the sprite set files.
//!
//! # Layout
//!
//! ```text
//! header   entry_count entries_offset set_count sets_offset
//! entry    id name_offset index:i16 set_index:u16   (0x1000 set for textures)
//! set      id name_offset file_name_offset index
//! ```

mod database;
mod error;

pub use database::{SpriteDataInfo, SpriteDatabase, SpriteSetInfo};
pub use error::{Error, Result};
