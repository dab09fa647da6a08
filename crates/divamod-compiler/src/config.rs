//! Compiler configuration (`divamod.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::packer::PackSettings;
use crate::{Error, Result};

/// First id handed out to sprite sets, sprites and textures.
pub const DEFAULT_FIRST_SPRITE_ID: u32 = 85000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Directory holding one subdirectory per mod.
    pub mods_dir: PathBuf,
    /// Per-mod source folder; sprites are read from `<mod>/<source_folder>/2d`.
    pub source_folder: String,
    /// Directory searched for `base_<set>.bin` and `base_spr_db.bin`.
    pub base_dir: PathBuf,
    /// Sets whose name is a prefix of one of these are compiled once for all mods.
    pub cumulative_sets: Vec<String>,
    /// Mod folder receiving the cumulative sets.
    pub priority_folder: String,
    pub first_sprite_id: u32,
    pub farc: FArcSettings,
    pub pack: PackSettings,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            mods_dir: PathBuf::from("./mods_102"),
            source_folder: "rom_src".to_string(),
            base_dir: PathBuf::from("."),
            cumulative_sets: vec!["SPR_SEL_PVTMB".to_string()],
            priority_folder: "AAA - MERGER PRIORITY".to_string(),
            first_sprite_id: DEFAULT_FIRST_SPRITE_ID,
            farc: FArcSettings::default(),
            pack: PackSettings {
                allow_ycbcr: false,
                ..PackSettings::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FArcSettings {
    pub compressed: bool,
    pub alignment: u32,
}

impl Default for FArcSettings {
    fn default() -> Self {
        Self {
            compressed: false,
            alignment: divamod_farc::DEFAULT_ALIGNMENT,
        }
    }
}

impl CompilerConfig {
    /// Load a configuration file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Output folder for the cumulative sets.
    pub fn priority_output_dir(&self) -> PathBuf {
        self.mods_dir.join(&self.priority_folder).join("rom").join("2d")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.first_sprite_id, 85000);
        assert_eq!(config.cumulative_sets, ["SPR_SEL_PVTMB"]);
        assert!(!config.pack.allow_ycbcr);
        assert!(!config.farc.compressed);
        assert_eq!(config.farc.alignment, 16);
    }

    #[test]
    fn test_partial_toml() {
        let config: CompilerConfig = toml::from_str(
            r#"
            mods_dir = "mods"
            first_sprite_id = 90000

            [pack]
            sprite_padding = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.mods_dir, PathBuf::from("mods"));
        assert_eq!(config.first_sprite_id, 90000);
        assert_eq!(config.source_folder, "rom_src");
        assert_eq!(config.pack.sprite_padding, 4);
        assert_eq!(config.pack.max_texture_size, [2048, 1024]);
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("divamod.toml");
        fs::write(&path, "first_sprite_id = \"nope\"").unwrap();

        let err = CompilerConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("divamod.toml"));
    }

    #[test]
    fn test_priority_output_dir() {
        let config = CompilerConfig::default();
        assert_eq!(
            config.priority_output_dir(),
            PathBuf::from("./mods_102/AAA - MERGER PRIORITY/rom/2d")
        );
    }
}
