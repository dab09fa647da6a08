//! TXP texture set codec.
//!
//! Textures inside sprite containers are stored as a `TexSet`: a list of
//! pointers to `Tex` records, each of which points at its mip maps. Every
//! pointer is relative to the start of the structure that holds it.
//!
//! # Layout
//!
//! ```text
//! TexSet  'TXP\x03' count packed_info [tex_offset; count]
//! Tex     'TXP\x04' | 'TXP\x05'  mip_map_count  mip_levels array_size 1 1  [mip_offset; ..]
//! MipMap  'TXP\x02' width height format mip_index array_index 0 0 data_size [data]
//! ```
//!
//! # Example
//!
//! ```
//! use divamod_txp::{MipMap, Tex, TexSet, TextureFormat};
//!
//! let mip = MipMap::new(2, 2, TextureFormat::RGBA8, vec![0xFF; 16]);
//! let set = TexSet { textures: vec![Tex::new_2d("MERGE_NOCOMP_000", vec![mip])] };
//!
//! let bytes = set.to_bytes()?;
//! let decoded = TexSet::from_bytes(&bytes)?;
//! assert_eq!(decoded.textures[0].mip_maps[0][0].data.len(), 16);
//! # Ok::<(), divamod_txp::Error>(())
//! ```

mod error;
mod format;
mod tex;
mod tex_set;

pub use error::{Error, Result};
pub use format::{signature, TexSignature, TextureFormat};
pub use tex::{MipMap, Tex};
pub use tex_set::TexSet;
