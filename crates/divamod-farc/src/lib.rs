//! FArc archive packer and reader.
//!
//! Sprite sets ship inside FArc archives. Two kinds are supported: `FArc`
//! (stored) and `FArC` (gzip per file). Encrypted `FARC` archives are
//! rejected.
//!
//! # Layout
//!
//! ```text
//! signature        'FArc' | 'FArC'
//! header_size      u32 BE, bytes after this field up to the end of the entry table
//! alignment        u32 BE
//! entries          name\0 offset [compressed_size] size   (u32 BE each)
//! padding          to alignment
//! data             one file after another, each padded to alignment
//! ```

mod archive;
mod error;
mod header;
mod packer;

pub use archive::{FArc, FArcEntry};
pub use error::{Error, Result};
pub use header::FArcHeader;
pub use packer::{FArcPacker, DEFAULT_ALIGNMENT};
