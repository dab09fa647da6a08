//! End-to-end compiles over temporary mod folders.

use std::fs;
use std::path::{Path, PathBuf};

use divamod_compiler::{Compiler, CompilerConfig, MOD_DATABASE_FILE_NAME};
use divamod_farc::FArc;
use divamod_spr::{SprSet, Sprite};
use divamod_sprdb::{SpriteDataInfo, SpriteDatabase, SpriteSetInfo};
use divamod_txp::{MipMap, Tex, TexSet, TextureFormat};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("mods")).unwrap();
        fs::create_dir_all(dir.path().join("base")).unwrap();
        Self { dir }
    }

    fn config(&self) -> CompilerConfig {
        CompilerConfig {
            mods_dir: self.mods_dir(),
            base_dir: self.dir.path().join("base"),
            ..Default::default()
        }
    }

    fn mods_dir(&self) -> PathBuf {
        self.dir.path().join("mods")
    }

    fn base_dir(&self) -> PathBuf {
        self.dir.path().join("base")
    }

    fn output_dir(&self, mod_name: &str) -> PathBuf {
        self.mods_dir().join(mod_name).join("rom").join("2d")
    }

    /// Write a manifest plus one solid PNG per listed file.
    fn add_mod(&self, mod_name: &str, manifest: &str, images: &[(&str, u32, u32)]) {
        let source = self.mods_dir().join(mod_name).join("rom_src").join("2d");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("spr_info.json"), manifest).unwrap();
        for &(file, width, height) in images {
            write_png(&source.join(file), width, height);
        }
    }
}

fn write_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255]))
        .save(path)
        .unwrap();
}

fn read_set(archive: &Path, entry: &str) -> SprSet {
    let farc = FArc::open(archive).unwrap();
    SprSet::from_bytes(&farc.read_file(entry).unwrap()).unwrap()
}

fn read_database(dir: &Path) -> SpriteDatabase {
    SpriteDatabase::from_bytes(&fs::read(dir.join(MOD_DATABASE_FILE_NAME)).unwrap()).unwrap()
}

fn entries(entries: &[SpriteDataInfo]) -> Vec<(u32, &str, i32)> {
    entries
        .iter()
        .map(|e| (e.id, e.name.as_str(), e.index))
        .collect()
}

const TEST_SET: &str = r#"{
    "Sets": [
        {
            "Name": "SPR_TEST",
            "Sprites": [
                { "Name": "ICON", "File": "icon.png" },
                { "Name": "BG", "File": "bg.png" }
            ]
        }
    ]
}"#;

#[test]
fn test_compile_writes_archive_and_database() {
    let ws = Workspace::new();
    ws.add_mod("a_mod", TEST_SET, &[("icon.png", 32, 32), ("bg.png", 64, 16)]);
    ws.add_mod(
        "b_mod",
        r#"{ "Sets": [ { "Name": "SPR_OTHER", "Sprites": [ { "Name": "LOGO", "File": "logo.png" } ] } ] }"#,
        &[("logo.png", 8, 8)],
    );

    let mut compiler = Compiler::new(ws.config());
    let report = compiler.compile_all().unwrap();
    assert_eq!(report.mods_compiled, 2);
    assert_eq!(report.sets_written, 2);
    assert_eq!(report.sets_merged, 0);

    let out = ws.output_dir("a_mod");
    let set = read_set(&out.join("spr_test.farc"), "spr_test.bin");
    let names: Vec<_> = set.sprites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["BG", "ICON"]);
    assert_eq!(set.tex_set.textures.len(), 1);
    assert_eq!(set.tex_set.textures[0].name, "MERGE_NOCOMP_000");

    let db = read_database(&out);
    assert_eq!(db.sets.len(), 1);
    let info = &db.sets[0];
    assert_eq!((info.id, info.name.as_str()), (85000, "SPR_TEST"));
    assert_eq!(info.file_name, "spr_test.bin");
    assert_eq!(
        entries(&info.sprites),
        [(85001, "SPR_TEST_ICON", 1), (85002, "SPR_TEST_BG", 0)]
    );
    assert_eq!(
        entries(&info.textures),
        [(85003, "SPRTEX_TEST_MERGE_NOCOMP_000", 0)]
    );

    // Ids keep counting across mods.
    let db = read_database(&ws.output_dir("b_mod"));
    assert_eq!(db.sets[0].id, 85004);
    assert_eq!(entries(&db.sets[0].sprites), [(85005, "SPR_OTHER_LOGO", 0)]);
    assert_eq!(compiler.ids().peek(), Some(85007));
}

#[test]
fn test_ineligible_set_allocates_nothing() {
    let ws = Workspace::new();
    // bg.png is never written.
    ws.add_mod("a_mod", TEST_SET, &[("icon.png", 32, 32)]);

    let mut compiler = Compiler::new(ws.config());
    let report = compiler.compile_all().unwrap();
    assert_eq!(report.sets_skipped, 1);
    assert_eq!(report.sets_written, 0);

    let out = ws.output_dir("a_mod");
    assert!(!out.join("spr_test.farc").exists());
    assert!(read_database(&out).sets.is_empty());
    assert_eq!(compiler.ids().peek(), Some(85000));
}

#[test]
fn test_mod_without_manifest_is_skipped() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.mods_dir().join("plain_mod")).unwrap();

    let report = Compiler::new(ws.config()).compile_all().unwrap();
    assert_eq!(report.mods_skipped, 1);
    assert!(!ws.output_dir("plain_mod").exists());
}

#[test]
fn test_missing_mods_directory() {
    let ws = Workspace::new();
    let config = CompilerConfig {
        mods_dir: ws.dir.path().join("nope"),
        ..ws.config()
    };
    assert!(Compiler::new(config).compile_all().is_err());
}

#[test]
fn test_base_data_is_merged() {
    let ws = Workspace::new();
    ws.add_mod("a_mod", TEST_SET, &[("icon.png", 32, 32), ("bg.png", 64, 16)]);

    let base = SprSet {
        flags: 0,
        tex_set: TexSet {
            textures: vec![Tex::new_2d(
                "MERGE_BC5COMP_0",
                vec![MipMap::new(4, 4, TextureFormat::RGBA8, vec![0; 64])],
            )],
        },
        sprites: vec![Sprite {
            name: "OLD".to_string(),
            texture_index: 0,
            ..Default::default()
        }],
    };
    fs::write(ws.base_dir().join("base_spr_test.bin"), base.to_bytes().unwrap()).unwrap();

    let mut base_info = SpriteSetInfo::new(412, "SPR_TEST", "spr_test.bin");
    base_info
        .textures
        .push(SpriteDataInfo::new(413, "SPRTEX_TEST_MERGE_BC5COMP_0", 0));
    base_info
        .sprites
        .push(SpriteDataInfo::new(414, "SPR_TEST_OLD", 0));
    let base_db = SpriteDatabase {
        sets: vec![base_info],
    };
    fs::write(ws.base_dir().join("base_spr_db.bin"), base_db.to_bytes().unwrap()).unwrap();

    let report = Compiler::new(ws.config()).compile_all().unwrap();
    assert_eq!(report.sets_merged, 1);

    let out = ws.output_dir("a_mod");
    let set = read_set(&out.join("spr_test.farc"), "spr_test.bin");
    let textures: Vec<_> = set.tex_set.textures.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(textures, ["MERGE_NOCOMP_000", "MERGE_BC5COMP_001"]);
    let old = set.sprite("OLD").unwrap();
    assert_eq!(old.texture_index, 1);
    assert_eq!(set.sprites.last().map(|s| s.name.as_str()), Some("OLD"));

    let info = &read_database(&out).sets[0];
    assert_eq!(info.id, 412);
    assert_eq!(
        entries(&info.textures),
        [
            (85003, "SPRTEX_TEST_MERGE_NOCOMP_000", 0),
            (85004, "SPRTEX_TEST_MERGE_BC5COMP_001", 1),
        ]
    );
    assert_eq!(entries(&info.sprites)[2], (85005, "SPR_TEST_OLD", 2));
}

#[test]
fn test_cumulative_sets_are_coalesced() {
    let ws = Workspace::new();
    let thumbs = |sprite: &str, file: &str| {
        format!(
            r#"{{ "Sets": [ {{ "Name": "SPR_SEL_PVTMB", "Sprites": [ {{ "Name": "{sprite}", "File": "{file}" }} ] }} ] }}"#
        )
    };
    ws.add_mod("a_mod", &thumbs("PV001", "a.png"), &[("a.png", 16, 16)]);
    ws.add_mod("b_mod", &thumbs("PV002", "b.png"), &[("b.png", 16, 16)]);

    let mut config = ws.config();
    config.farc.compressed = true;
    let report = Compiler::new(config.clone()).compile_all().unwrap();
    assert_eq!(report.sets_written, 1);

    // Per-mod databases are written even though they are empty.
    assert!(read_database(&ws.output_dir("a_mod")).sets.is_empty());
    assert!(!ws.output_dir("a_mod").join("spr_sel_pvtmb.farc").exists());

    let priority = config.priority_output_dir();
    let archive = priority.join("spr_sel_pvtmb.farc");
    assert!(FArc::open(&archive).unwrap().is_compressed());

    let set = read_set(&archive, "spr_sel_pvtmb.bin");
    let names: Vec<_> = set.sprites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["PV001", "PV002"]);

    let db = read_database(&priority);
    assert_eq!(db.sets.len(), 1);
    assert_eq!(
        entries(&db.sets[0].sprites),
        [
            (85001, "SPR_SEL_PVTMB_PV001", 0),
            (85002, "SPR_SEL_PVTMB_PV002", 1),
        ]
    );
}
