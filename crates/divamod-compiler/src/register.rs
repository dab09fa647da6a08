//! Database entries for freshly packed sets.

use divamod_spr::SprSet;
use divamod_sprdb::{SpriteDataInfo, SpriteSetInfo};

use crate::ids::IdAllocator;
use crate::manifest::SpriteSetSource;
use crate::Result;

/// Texture name used when a packed texture has none.
const FALLBACK_TEXTURE_NAME: &str = "MERGE_NOCOMP_0";

/// Build the database set for a packed sprite set.
///
/// Ids are taken in order: the set, every manifest sprite, every texture.
pub fn register_set(
    ids: &mut IdAllocator,
    source: &SpriteSetSource,
    packed: &SprSet,
) -> Result<SpriteSetInfo> {
    let mut info = SpriteSetInfo::new(
        ids.allocate()?,
        source.name.clone(),
        format!("{}.bin", source.file_stem()),
    );

    info.sprites = source
        .sprites
        .iter()
        .map(|sprite| {
            Ok(SpriteDataInfo::new(
                ids.allocate()?,
                format!("{}_{}", source.name, sprite.name),
                sprite_index(packed, &sprite.name),
            ))
        })
        .collect::<Result<_>>()?;

    info.textures = packed
        .tex_set
        .textures
        .iter()
        .enumerate()
        .map(|(index, tex)| {
            Ok(SpriteDataInfo::new(
                ids.allocate()?,
                texture_entry_name(&source.name, &tex.name),
                index as i32,
            ))
        })
        .collect::<Result<_>>()?;

    tracing::debug!(
        set = %info.name,
        id = info.id,
        sprites = info.sprites.len(),
        textures = info.textures.len(),
        "registered sprite set"
    );
    Ok(info)
}

/// Position of the first packed sprite whose name starts with `name`, or -1.
pub fn sprite_index(packed: &SprSet, name: &str) -> i32 {
    packed
        .sprites
        .iter()
        .position(|sprite| sprite.name.starts_with(name))
        .map_or(-1, |index| index as i32)
}

/// `SPRTEX_<set without its 4-char prefix>_<texture>`.
pub fn texture_entry_name(set_name: &str, texture_name: &str) -> String {
    let set = set_name.get(4..).unwrap_or_default();
    let texture = if texture_name.is_empty() {
        FALLBACK_TEXTURE_NAME
    } else {
        texture_name
    };
    format!("SPRTEX_{set}_{texture}")
}
