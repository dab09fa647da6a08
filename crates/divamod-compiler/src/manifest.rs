//! `spr_info.json` manifest loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Manifest file name inside a mod's `2d` source folder.
pub const MANIFEST_FILE_NAME: &str = "spr_info.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpriteManifest {
    #[serde(default)]
    pub sets: Vec<SpriteSetSource>,
}

/// A sprite set as authored by a modder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpriteSetSource {
    pub name: String,
    #[serde(default)]
    pub sprites: Vec<SpriteSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpriteSource {
    pub name: String,
    /// Image path. Relative to the manifest until resolved.
    #[serde(default)]
    pub file: PathBuf,
    #[serde(default = "default_internal_id")]
    pub internal_id: i32,
}

fn default_internal_id() -> i32 {
    -1
}

impl SpriteSetSource {
    /// Whether every sprite names an existing image file.
    pub fn is_eligible(&self) -> bool {
        self.sprites
            .iter()
            .all(|sprite| !sprite.file.as_os_str().is_empty() && sprite.file.is_file())
    }

    /// Whether this set belongs to the cumulative list.
    ///
    /// A set is cumulative when its name is a prefix of a cumulative name.
    pub fn is_cumulative(&self, cumulative_names: &[String]) -> bool {
        cumulative_names.iter().any(|name| name.starts_with(&self.name))
    }

    /// Lowercased base name used for output files.
    pub fn file_stem(&self) -> String {
        self.name.to_lowercase()
    }
}

impl SpriteManifest {
    /// Parse a manifest and resolve sprite paths against `root`.
    pub fn parse(json: &str, root: &Path) -> serde_json::Result<Self> {
        let mut manifest: Self = serde_json::from_str(json)?;
        for sprite in manifest.sets.iter_mut().flat_map(|set| &mut set.sprites) {
            if !sprite.file.as_os_str().is_empty() {
                sprite.file = root.join(&sprite.file);
            }
        }
        Ok(manifest)
    }

    /// Load `<root>/spr_info.json`. Returns `None` if there is none.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(MANIFEST_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        Self::parse(&json, root)
            .map(Some)
            .map_err(|source| Error::Manifest { path, source })
    }

    /// Split into regular and cumulative sets, keeping manifest order.
    pub fn split_cumulative(
        self,
        cumulative_names: &[String],
    ) -> (Vec<SpriteSetSource>, Vec<SpriteSetSource>) {
        self.sets
            .into_iter()
            .partition(|set| !set.is_cumulative(cumulative_names))
    }
}

/// Merge sets that share a name, concatenating their sprites.
///
/// The first occurrence of a name determines its position.
pub fn coalesce_sets(sets: Vec<SpriteSetSource>) -> Vec<SpriteSetSource> {
    let mut result: Vec<SpriteSetSource> = Vec::with_capacity(sets.len());
    for set in sets {
        match result.iter_mut().find(|existing| existing.name == set.name) {
            Some(existing) => existing.sprites.extend(set.sprites),
            None => result.push(set),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Sets": [
            {
                "Name": "SPR_SEL_PV900",
                "Sprites": [
                    { "Name": "SONG_BG", "File": "bg.png" },
                    { "Name": "SONG_JK", "File": "jk.png", "InternalId": 7 }
                ]
            },
            { "Name": "SPR_SEL_PVTMB", "Sprites": [ { "Name": "THUMB", "File": "" } ] }
        ]
    }"#;

    #[test]
    fn test_parse_resolves_paths() {
        let manifest = SpriteManifest::parse(SAMPLE, Path::new("mods/a/rom_src/2d")).unwrap();
        let set = &manifest.sets[0];

        assert_eq!(set.sprites[0].file, Path::new("mods/a/rom_src/2d/bg.png"));
        assert_eq!(set.sprites[0].internal_id, -1);
        assert_eq!(set.sprites[1].internal_id, 7);
        assert!(manifest.sets[1].sprites[0].file.as_os_str().is_empty());
    }

    #[test]
    fn test_split_cumulative() {
        let manifest = SpriteManifest::parse(SAMPLE, Path::new(".")).unwrap();
        let (regular, cumulative) = manifest.split_cumulative(&["SPR_SEL_PVTMB".to_string()]);

        assert_eq!(regular.len(), 1);
        assert_eq!(regular[0].name, "SPR_SEL_PV900");
        assert_eq!(cumulative.len(), 1);
    }

    #[test]
    fn test_prefix_of_cumulative_name_is_cumulative() {
        let set = SpriteSetSource {
            name: "SPR_SEL_PVT".to_string(),
            sprites: Vec::new(),
        };
        assert!(set.is_cumulative(&["SPR_SEL_PVTMB".to_string()]));

        let set = SpriteSetSource {
            name: "SPR_SEL_PVTMB_EXTRA".to_string(),
            sprites: Vec::new(),
        };
        assert!(!set.is_cumulative(&["SPR_SEL_PVTMB".to_string()]));
    }

    #[test]
    fn test_eligibility() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bg.png"), b"not really a png").unwrap();

        let manifest = SpriteManifest::parse(SAMPLE, dir.path()).unwrap();
        // jk.png is missing.
        assert!(!manifest.sets[0].is_eligible());
        // Empty file name.
        assert!(!manifest.sets[1].is_eligible());

        let mut set = manifest.sets[0].clone();
        set.sprites.truncate(1);
        assert!(set.is_eligible());
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(SpriteManifest::load(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_load_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE_NAME), "{ \"Sets\": 3 }").unwrap();
        assert!(matches!(
            SpriteManifest::load(dir.path()),
            Err(Error::Manifest { .. })
        ));
    }

    #[test]
    fn test_coalesce_sets() {
        let set = |name: &str, sprite: &str| SpriteSetSource {
            name: name.to_string(),
            sprites: vec![SpriteSource {
                name: sprite.to_string(),
                ..Default::default()
            }],
        };
        let merged = coalesce_sets(vec![set("A", "1"), set("B", "2"), set("A", "3")]);

        assert_eq!(merged.len(), 2);
        let names: Vec<_> = merged[0].sprites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["1", "3"]);
    }
}
