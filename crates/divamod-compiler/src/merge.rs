//! Splicing base game sprite data into freshly packed sets.
//!
//! Base data lives next to the compiler as `base_<set>.bin` (a raw sprite
//! set) and `base_spr_db.bin` (the game's sprite database). Fresh entries
//! keep their indices; base textures and sprites are appended after them.

use std::fs;
use std::path::{Path, PathBuf};

use divamod_spr::SprSet;
use divamod_sprdb::{SpriteDataInfo, SpriteDatabase, SpriteSetInfo};

use crate::ids::IdAllocator;
use crate::Result;

/// File name of the base sprite database.
pub const BASE_DATABASE_FILE_NAME: &str = "base_spr_db.bin";

/// Path of the base sprite set for `set_name`.
pub fn base_set_path(base_dir: &Path, set_name: &str) -> PathBuf {
    base_dir.join(format!("base_{}.bin", set_name.to_lowercase()))
}

/// Replace the final `_suffix` of `name` with a three digit index.
///
/// A name without `_` keeps all of it as the stem.
pub fn texture_name_with_index(name: &str, index: usize) -> String {
    let stem = name.rfind('_').map_or(name, |end| &name[..end]);
    format!("{stem}_{index:03}")
}

/// Append `base` and its database entries to a fresh set.
///
/// Returns `false` without touching anything when the database entry does not
/// describe the base set. Running out of ids is an error.
pub fn merge_sets(
    ids: &mut IdAllocator,
    set: &mut SprSet,
    info: &mut SpriteSetInfo,
    base: SprSet,
    base_info: &SpriteSetInfo,
) -> Result<bool> {
    if base_info.textures.len() != base.tex_set.textures.len()
        || base_info.sprites.len() != base.sprites.len()
    {
        tracing::warn!(
            set = %info.name,
            textures = base.tex_set.textures.len(),
            db_textures = base_info.textures.len(),
            sprites = base.sprites.len(),
            db_sprites = base_info.sprites.len(),
            "base sprite set does not match its database entry, skipping merge"
        );
        return Ok(false);
    }

    info.id = base_info.id;

    let texture_count = set.tex_set.textures.len();
    for (i, (mut tex, tex_info)) in base
        .tex_set
        .textures
        .into_iter()
        .zip(&base_info.textures)
        .enumerate()
    {
        let index = texture_count + i;
        tex.name = texture_name_with_index(&tex.name, index);
        set.tex_set.textures.push(tex);

        info.textures.push(SpriteDataInfo::new(
            ids.allocate()?,
            texture_name_with_index(&tex_info.name, index),
            index as i32,
        ));
    }

    let sprite_count = set.sprites.len();
    for (i, (mut sprite, sprite_info)) in base
        .sprites
        .into_iter()
        .zip(&base_info.sprites)
        .enumerate()
    {
        sprite.texture_index += texture_count as i32;
        set.sprites.push(sprite);

        info.sprites.push(SpriteDataInfo::new(
            ids.allocate()?,
            sprite_info.name.clone(),
            (sprite_count + i) as i32,
        ));
    }

    tracing::info!(
        set = %info.name,
        id = info.id,
        textures = base_info.textures.len(),
        sprites = base_info.sprites.len(),
        "merged base sprite data"
    );
    Ok(true)
}

/// Merge base game data from `base_dir` into a fresh set, if there is any.
///
/// Returns whether a merge happened.
pub fn merge_base(
    ids: &mut IdAllocator,
    base_dir: &Path,
    set: &mut SprSet,
    info: &mut SpriteSetInfo,
) -> Result<bool> {
    let set_path = base_set_path(base_dir, &info.name);
    let db_path = base_dir.join(BASE_DATABASE_FILE_NAME);
    if !set_path.is_file() || !db_path.is_file() {
        return Ok(false);
    }

    let base = SprSet::from_bytes(&fs::read(&set_path)?)?;
    let database = SpriteDatabase::from_bytes(&fs::read(&db_path)?)?;

    let Some(base_info) = database.find_set(&info.name) else {
        tracing::warn!(
            set = %info.name,
            path = %db_path.display(),
            "set missing from base sprite database, skipping merge"
        );
        return Ok(false);
    };

    merge_sets(ids, set, info, base, base_info)
}
