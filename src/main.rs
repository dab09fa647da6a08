//! Divamod CLI - Command-line tool for compiling Project DIVA mod sprites.
//!
//! This is the main entry point for the divamod command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use divamod::prelude::*;

/// Divamod - Project DIVA mod sprite compiler
#[derive(Parser)]
#[command(name = "divamod")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the sprite sets of every mod
    Compile {
        /// TOML configuration file
        #[arg(short, long, env = "DIVAMOD_CONFIG")]
        config: Option<PathBuf>,

        /// Mods directory (overrides the config)
        #[arg(short, long, env = "DIVAMOD_MODS_DIR")]
        mods_dir: Option<PathBuf>,

        /// Directory with base_spr_db.bin and base_<set>.bin files
        #[arg(short, long, env = "DIVAMOD_BASE_DIR")]
        base_dir: Option<PathBuf>,

        /// Write gzip compressed archives
        #[arg(long)]
        compressed: bool,
    },

    /// List the textures and sprites of a sprite set
    SprInfo {
        /// Sprite set (.bin) or archive (.farc) holding one
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Dump a sprite database
    DbInfo {
        /// Sprite database file
        #[arg(short, long)]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract the files of an FArc archive
    FarcExtract {
        /// Input archive
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            config,
            mods_dir,
            base_dir,
            compressed,
        } => {
            cmd_compile(config.as_deref(), mods_dir, base_dir, compressed)?;
        }
        Commands::SprInfo { input } => {
            cmd_spr_info(&input)?;
        }
        Commands::DbInfo { input, json } => {
            cmd_db_info(&input, json)?;
        }
        Commands::FarcExtract { input, output } => {
            cmd_farc_extract(&input, &output)?;
        }
    }

    Ok(())
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn cmd_compile(
    config_path: Option<&Path>,
    mods_dir: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    compressed: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => CompilerConfig::load(path).context("Failed to load config")?,
        None => CompilerConfig::default(),
    };
    if let Some(mods_dir) = mods_dir {
        config.mods_dir = mods_dir;
    }
    if let Some(base_dir) = base_dir {
        config.base_dir = base_dir;
    }
    config.farc.compressed |= compressed;

    let start = Instant::now();
    let mut compiler = Compiler::new(config);
    let mod_dirs = compiler
        .mod_directories()
        .context("Failed to list mod directories")?;

    println!(
        "Compiling {} mods from {}",
        mod_dirs.len(),
        compiler.config().mods_dir.display()
    );

    let pb = progress_bar(mod_dirs.len())?;
    let mut report = CompileReport::default();
    let mut cumulative = Vec::new();

    for mod_dir in &mod_dirs {
        report += compiler
            .compile_mod(mod_dir, &mut cumulative)
            .with_context(|| format!("Failed to compile {}", mod_dir.display()))?;
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    report += compiler
        .compile_cumulative(cumulative)
        .context("Failed to compile cumulative sprite sets")?;

    println!(
        "Compiled {} mods ({} without manifest) in {:?}",
        report.mods_compiled,
        report.mods_skipped,
        start.elapsed()
    );
    println!(
        "Sets: {} written, {} skipped, {} merged with base data",
        report.sets_written, report.sets_skipped, report.sets_merged
    );
    match compiler.ids().peek() {
        Some(id) => println!("Next sprite id: {id}"),
        None => println!("Sprite ids exhausted"),
    }

    Ok(())
}

/// Read a sprite set from a `.bin`, or from the first entry of a `.farc`.
fn load_spr_set(input: &Path) -> Result<SprSet> {
    let is_farc = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("farc"));

    let data = if is_farc {
        let farc = FArc::open(input).context("Failed to open archive")?;
        let entry = farc
            .entries()
            .first()
            .context("Archive is empty")?;
        farc.read(entry).context("Failed to read archive entry")?
    } else {
        fs::read(input).context("Failed to read input file")?
    };

    SprSet::from_bytes(&data).context("Failed to parse sprite set")
}

fn cmd_spr_info(input: &Path) -> Result<()> {
    let set = load_spr_set(input)?;

    println!("Flags: {:#x}", set.flags);
    println!("Textures: {}", set.tex_set.textures.len());
    for (i, tex) in set.tex_set.textures.iter().enumerate() {
        let (width, height) = tex.size();
        println!(
            "  [{:3}] {:<32} {:>5}x{:<5} {:<8} {} mips x {}",
            i,
            tex.name,
            width,
            height,
            tex.format(),
            tex.mip_levels(),
            tex.array_size()
        );
    }

    println!("Sprites: {}", set.sprites.len());
    for (i, sprite) in set.sprites.iter().enumerate() {
        let [x, y, w, h] = sprite.pixel_region;
        println!(
            "  [{:3}] {:<32} tex {:<3} {:>6}x{:<6} at ({}, {}) {}",
            i, sprite.name, sprite.texture_index, w, h, x, y, sprite.extra.screen_mode
        );
    }

    Ok(())
}

fn cmd_db_info(input: &Path, json: bool) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let database = SpriteDatabase::from_bytes(&data).context("Failed to parse sprite database")?;

    if json {
        let text = serde_json::to_string_pretty(&database).context("Failed to serialize JSON")?;
        println!("{text}");
        return Ok(());
    }

    for set in &database.sets {
        println!("{} {} ({})", set.id, set.name, set.file_name);
        for sprite in &set.sprites {
            println!("  spr {:>6} {:>4} {}", sprite.id, sprite.index, sprite.name);
        }
        for tex in &set.textures {
            println!("  tex {:>6} {:>4} {}", tex.id, tex.index, tex.name);
        }
    }
    println!(
        "\nTotal: {} sets, {} entries",
        database.sets.len(),
        database.entry_count()
    );

    Ok(())
}

fn cmd_farc_extract(input: &Path, output: &Path) -> Result<()> {
    println!("Opening archive: {}", input.display());

    let farc = FArc::open(input).context("Failed to open archive")?;
    println!(
        "Extracting {} entries{}...",
        farc.entries().len(),
        if farc.is_compressed() { " (compressed)" } else { "" }
    );

    fs::create_dir_all(output)?;

    let pb = progress_bar(farc.entries().len())?;
    for entry in farc.entries() {
        // Archives are flat; drop any directory part of the stored name.
        let Some(file_name) = Path::new(&entry.name).file_name() else {
            tracing::warn!(name = %entry.name, "skipping entry without a file name");
            pb.inc(1);
            continue;
        };

        let data = farc
            .read(entry)
            .with_context(|| format!("Failed to read {}", entry.name))?;
        fs::write(output.join(file_name), data)
            .with_context(|| format!("Failed to write {}", entry.name))?;
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    Ok(())
}
