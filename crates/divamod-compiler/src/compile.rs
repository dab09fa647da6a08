//! Compile pipeline: manifests in, archives and sprite databases out.

use std::fs;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use divamod_farc::FArcPacker;
use divamod_spr::SprSet;
use divamod_sprdb::SpriteDatabase;

use crate::config::CompilerConfig;
use crate::ids::IdAllocator;
use crate::manifest::{coalesce_sets, SpriteManifest, SpriteSetSource};
use crate::merge::merge_base;
use crate::packer::{ShelfPacker, SprMarkup, SpritePacker};
use crate::register::register_set;
use crate::{Error, Result};

/// Name of the database written next to the compiled archives.
pub const MOD_DATABASE_FILE_NAME: &str = "mod_spr_db.bin";

/// Counters collected while compiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Mods with a manifest.
    pub mods_compiled: usize,
    /// Mods without a manifest.
    pub mods_skipped: usize,
    pub sets_written: usize,
    /// Sets with a missing or empty sprite file.
    pub sets_skipped: usize,
    /// Sets merged with base game data.
    pub sets_merged: usize,
}

impl AddAssign for CompileReport {
    fn add_assign(&mut self, other: Self) {
        self.mods_compiled += other.mods_compiled;
        self.mods_skipped += other.mods_skipped;
        self.sets_written += other.sets_written;
        self.sets_skipped += other.sets_skipped;
        self.sets_merged += other.sets_merged;
    }
}

/// Sprite compiler for a mods directory.
///
/// One compiler is one run: sprite ids keep counting up across every mod
/// and the cumulative sets.
///
/// # Example
///
/// ```no_run
/// use divamod_compiler::{Compiler, CompilerConfig};
///
/// let mut compiler = Compiler::new(CompilerConfig::default());
/// let report = compiler.compile_all()?;
/// println!("{} sets written", report.sets_written);
/// # Ok::<(), divamod_compiler::Error>(())
/// ```
#[derive(Debug)]
pub struct Compiler<P: SpritePacker = ShelfPacker> {
    config: CompilerConfig,
    ids: IdAllocator,
    packer: P,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_packer(config, ShelfPacker)
    }
}

impl<P: SpritePacker> Compiler<P> {
    /// Create a compiler using a custom sprite packer.
    pub fn with_packer(config: CompilerConfig, packer: P) -> Self {
        let ids = IdAllocator::new(config.first_sprite_id);
        Self {
            config,
            ids,
            packer,
        }
    }

    #[inline]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Id allocator state.
    #[inline]
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Mod directories under the mods directory, sorted by path.
    pub fn mod_directories(&self) -> Result<Vec<PathBuf>> {
        let mods_dir = &self.config.mods_dir;
        if !mods_dir.is_dir() {
            return Err(Error::ModsDirectoryNotFound(mods_dir.clone()));
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(mods_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Compile every mod, then the cumulative sets.
    pub fn compile_all(&mut self) -> Result<CompileReport> {
        let mut report = CompileReport::default();
        let mut cumulative = Vec::new();

        for mod_dir in self.mod_directories()? {
            report += self.compile_mod(&mod_dir, &mut cumulative)?;
        }
        report += self.compile_cumulative(cumulative)?;

        tracing::info!(
            mods = report.mods_compiled,
            sets = report.sets_written,
            skipped = report.sets_skipped,
            merged = report.sets_merged,
            "compile finished"
        );
        Ok(report)
    }

    /// Compile `<mod>/<source>/2d` into `<mod>/rom/2d`.
    ///
    /// Cumulative sets are appended to `cumulative` instead of being written.
    pub fn compile_mod(
        &mut self,
        mod_dir: &Path,
        cumulative: &mut Vec<SpriteSetSource>,
    ) -> Result<CompileReport> {
        let source_dir = mod_dir.join(&self.config.source_folder).join("2d");
        let output_dir = mod_dir.join("rom").join("2d");
        self.compile_sprite_data(&source_dir, &output_dir, cumulative)
    }

    /// Compile the manifest in `source_dir` into `output_dir`.
    pub fn compile_sprite_data(
        &mut self,
        source_dir: &Path,
        output_dir: &Path,
        cumulative: &mut Vec<SpriteSetSource>,
    ) -> Result<CompileReport> {
        let Some(manifest) = SpriteManifest::load(source_dir)? else {
            tracing::info!(path = %source_dir.display(), "no sprite manifest, skipping");
            return Ok(CompileReport {
                mods_skipped: 1,
                ..Default::default()
            });
        };

        let (sets, cumulative_sets) = manifest.split_cumulative(&self.config.cumulative_sets);
        tracing::info!(
            path = %source_dir.display(),
            sets = sets.len(),
            cumulative = cumulative_sets.len(),
            "compiling sprite data"
        );
        cumulative.extend(cumulative_sets);

        let mut report = self.compile_sprite_sets_with_db(output_dir, &sets)?;
        report.mods_compiled += 1;
        Ok(report)
    }

    /// Compile the cumulative sets of every mod into the priority folder.
    ///
    /// Sets sharing a name are combined into one.
    pub fn compile_cumulative(&mut self, sets: Vec<SpriteSetSource>) -> Result<CompileReport> {
        let sets = coalesce_sets(sets);
        let output_dir = self.config.priority_output_dir();
        tracing::info!(
            path = %output_dir.display(),
            sets = sets.len(),
            "compiling cumulative sprite sets"
        );
        self.compile_sprite_sets_with_db(&output_dir, &sets)
    }

    /// Pack, register and merge each eligible set, writing one archive per
    /// set and the database of all of them.
    pub fn compile_sprite_sets_with_db(
        &mut self,
        output_dir: &Path,
        sets: &[SpriteSetSource],
    ) -> Result<CompileReport> {
        fs::create_dir_all(output_dir)?;

        let mut report = CompileReport::default();
        let mut database = SpriteDatabase::new();

        for source in sets {
            if !source.is_eligible() {
                tracing::info!(set = %source.name, "missing sprite files, skipping set");
                report.sets_skipped += 1;
                continue;
            }

            let mut set = self.pack_set(source)?;
            let mut info = register_set(&mut self.ids, source, &set)?;
            if merge_base(&mut self.ids, &self.config.base_dir, &mut set, &mut info)? {
                report.sets_merged += 1;
            }

            self.write_set_archive(output_dir, source, &set)?;
            database.sets.push(info);
            report.sets_written += 1;
        }

        let path = output_dir.join(MOD_DATABASE_FILE_NAME);
        fs::write(&path, database.to_bytes()?)?;
        tracing::debug!(
            path = %path.display(),
            sets = database.sets.len(),
            "wrote sprite database"
        );

        Ok(report)
    }

    fn pack_set(&self, source: &SpriteSetSource) -> Result<SprSet> {
        let markups = source
            .sprites
            .iter()
            .map(|sprite| {
                let image = image::open(&sprite.file)
                    .map_err(|source| Error::Image {
                        path: sprite.file.clone(),
                        source,
                    })?
                    .to_rgba8();
                Ok(SprMarkup::new(sprite.name.clone(), image))
            })
            .collect::<Result<Vec<_>>>()?;

        self.packer.pack(&markups, &self.config.pack)
    }

    fn write_set_archive(
        &self,
        output_dir: &Path,
        source: &SpriteSetSource,
        set: &SprSet,
    ) -> Result<()> {
        let stem = source.file_stem();
        let mut packer = FArcPacker::with_alignment(self.config.farc.alignment);
        packer.add_file(format!("{stem}.bin"), set.to_bytes()?);

        let path = output_dir.join(format!("{stem}.farc"));
        packer.write_to_file(&path, self.config.farc.compressed)?;
        tracing::debug!(
            path = %path.display(),
            sprites = set.sprites.len(),
            "wrote sprite archive"
        );
        Ok(())
    }
}
