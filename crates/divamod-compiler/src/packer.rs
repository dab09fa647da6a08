//! Sprite atlas packing.
//!
//! Sprites are sorted by area and placed on horizontal shelves inside
//! RGBA8 atlases. Block compression is not performed.

use std::cmp::Reverse;

use divamod_spr::{ScreenMode, SprSet, Sprite, SpriteExtra};
use divamod_txp::{MipMap, Tex, TexSet, TextureFormat};
use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Markup flag bits.
pub mod markup_flags {
    pub const NONE: u32 = 0;
    /// Give the sprite a texture of its own, without padding.
    pub const NO_MERGE: u32 = 1 << 0;
    /// Request block compression. Accepted, but atlases stay RGBA8.
    pub const COMPRESS: u32 = 1 << 1;
}

/// One source image to be packed.
#[derive(Debug, Clone)]
pub struct SprMarkup {
    pub name: String,
    pub image: RgbaImage,
    pub screen_mode: ScreenMode,
    pub flags: u32,
}

impl SprMarkup {
    /// A compressible 1080p markup, the way mod sprites are packed.
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
            screen_mode: ScreenMode::HDTV1080,
            flags: markup_flags::COMPRESS,
        }
    }

    #[inline]
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[inline]
    fn area(&self) -> u64 {
        let (width, height) = self.size();
        u64::from(width) * u64::from(height)
    }
}

/// Packer tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackSettings {
    /// Atlas capacity; larger sprites get a texture of their own.
    pub max_texture_size: [u32; 2],
    /// Border around each merged sprite, in pixels per side, filled with
    /// copies of the sprite's edge pixels.
    pub sprite_padding: u32,
    pub power_of_two: bool,
    /// Store rows bottom-up.
    pub flip_y: bool,
    pub allow_ycbcr: bool,
    /// RGBA fill for unused atlas space.
    pub background: [u8; 4],
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            max_texture_size: [2048, 1024],
            sprite_padding: 2,
            power_of_two: true,
            flip_y: true,
            allow_ycbcr: true,
            background: [0, 0, 0, 0],
        }
    }
}

/// Turns markups into a sprite set.
pub trait SpritePacker {
    fn pack(&self, markups: &[SprMarkup], settings: &PackSettings) -> Result<SprSet>;
}

/// Shelf-based atlas packer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfPacker;

/// Texture kinds in their output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MergeKind {
    Merge,
    NoMerge,
}

#[derive(Debug)]
struct Placement {
    markup: usize,
    /// Top-left corner of the padded box.
    x: u32,
    y: u32,
    padding: u32,
}

#[derive(Debug)]
struct Shelf {
    y: u32,
    height: u32,
    cursor: u32,
}

#[derive(Debug)]
struct Atlas {
    kind: MergeKind,
    index: usize,
    capacity: (u32, u32),
    open: bool,
    shelves: Vec<Shelf>,
    placements: Vec<Placement>,
}

impl Atlas {
    fn shared(index: usize, capacity: (u32, u32)) -> Self {
        Self {
            kind: MergeKind::Merge,
            index,
            capacity,
            open: true,
            shelves: Vec::new(),
            placements: Vec::new(),
        }
    }

    fn single(kind: MergeKind, index: usize, markup: usize, padding: u32) -> Self {
        Self {
            kind,
            index,
            capacity: (0, 0),
            open: false,
            shelves: Vec::new(),
            placements: vec![Placement {
                markup,
                x: 0,
                y: 0,
                padding,
            }],
        }
    }

    fn try_place(&mut self, markup: usize, box_size: (u32, u32), padding: u32) -> bool {
        if !self.open {
            return false;
        }
        let (box_width, box_height) = box_size;

        for shelf in &mut self.shelves {
            if box_height <= shelf.height && shelf.cursor + box_width <= self.capacity.0 {
                self.placements.push(Placement {
                    markup,
                    x: shelf.cursor,
                    y: shelf.y,
                    padding,
                });
                shelf.cursor += box_width;
                return true;
            }
        }

        let next_y = self.shelves.last().map_or(0, |s| s.y + s.height);
        if box_width > self.capacity.0 || next_y + box_height > self.capacity.1 {
            return false;
        }

        self.shelves.push(Shelf {
            y: next_y,
            height: box_height,
            cursor: box_width,
        });
        self.placements.push(Placement {
            markup,
            x: 0,
            y: next_y,
            padding,
        });
        true
    }

    /// Smallest size covering every placed box.
    fn texture_size(&self, markups: &[SprMarkup], power_of_two: bool) -> (u32, u32) {
        let (width, height) = self
            .placements
            .iter()
            .map(|p| {
                let (w, h) = markups[p.markup].size();
                (p.x + w + 2 * p.padding, p.y + h + 2 * p.padding)
            })
            .fold((1, 1), |(mw, mh), (w, h)| (mw.max(w), mh.max(h)));

        if power_of_two {
            (width.next_power_of_two(), height.next_power_of_two())
        } else {
            (width, height)
        }
    }

    fn name(&self) -> String {
        let merge = match self.kind {
            MergeKind::Merge => "MERGE",
            MergeKind::NoMerge => "NOMERGE",
        };
        format!("{merge}_NOCOMP_{:03}", self.index)
    }
}

/// Copy a sprite's outermost pixels into the padding ring around it.
fn extend_edges(canvas: &mut RgbaImage, (x, y, width, height): (u32, u32, u32, u32), padding: u32) {
    if padding == 0 || width == 0 || height == 0 {
        return;
    }

    let (left, top) = (x.saturating_sub(padding), y.saturating_sub(padding));
    let right = (x + width + padding).min(canvas.width());
    let bottom = (y + height + padding).min(canvas.height());

    for ty in top..bottom {
        let sy = ty.clamp(y, y + height - 1);
        for tx in left..right {
            let sx = tx.clamp(x, x + width - 1);
            if (sx, sy) != (tx, ty) {
                let pixel = *canvas.get_pixel(sx, sy);
                canvas.put_pixel(tx, ty, pixel);
            }
        }
    }
}

impl SpritePacker for ShelfPacker {
    fn pack(&self, markups: &[SprMarkup], settings: &PackSettings) -> Result<SprSet> {
        if settings.allow_ycbcr {
            tracing::debug!("YCbCr textures are not supported, packing RGBA8");
        }

        let [max_width, max_height] = settings.max_texture_size;
        let padding = settings.sprite_padding;

        let mut order: Vec<usize> = (0..markups.len()).collect();
        order.sort_by_key(|&i| Reverse(markups[i].area()));

        let mut atlases: Vec<Atlas> = Vec::new();
        let mut merge_count = 0;
        let mut no_merge_count = 0;

        for markup_index in order {
            let markup = &markups[markup_index];
            let (width, height) = markup.size();

            if markup.flags & markup_flags::NO_MERGE != 0 {
                atlases.push(Atlas::single(
                    MergeKind::NoMerge,
                    no_merge_count,
                    markup_index,
                    0,
                ));
                no_merge_count += 1;
            } else if width > max_width || height > max_height {
                atlases.push(Atlas::single(
                    MergeKind::Merge,
                    merge_count,
                    markup_index,
                    padding,
                ));
                merge_count += 1;
            } else {
                let box_size = (width + 2 * padding, height + 2 * padding);
                let placed = atlases
                    .iter_mut()
                    .any(|atlas| atlas.try_place(markup_index, box_size, padding));

                if !placed {
                    let capacity = (max_width.max(box_size.0), max_height.max(box_size.1));
                    let mut atlas = Atlas::shared(merge_count, capacity);
                    atlas.try_place(markup_index, box_size, padding);
                    atlases.push(atlas);
                    merge_count += 1;
                }
            }
        }

        atlases.sort_by_key(|atlas| (atlas.kind, atlas.index));

        let mut sprites = Vec::with_capacity(markups.len());
        let mut textures = Vec::with_capacity(atlases.len());

        for (texture_index, atlas) in atlases.iter().enumerate() {
            let (tex_width, tex_height) = atlas.texture_size(markups, settings.power_of_two);
            let mut canvas = RgbaImage::from_pixel(tex_width, tex_height, Rgba(settings.background));

            for placement in &atlas.placements {
                let markup = &markups[placement.markup];
                let (width, height) = markup.size();
                let x = placement.x + placement.padding;
                let y = placement.y + placement.padding;

                imageops::replace(&mut canvas, &markup.image, i64::from(x), i64::from(y));
                extend_edges(&mut canvas, (x, y, width, height), placement.padding);

                let (x, y, w, h) = (x as f32, y as f32, width as f32, height as f32);
                let (tw, th) = (tex_width as f32, tex_height as f32);
                sprites.push(Sprite {
                    name: markup.name.clone(),
                    texture_index: texture_index as i32,
                    rotate: 0,
                    texel_region: [x / tw, y / th, (x + w) / tw, (y + h) / th],
                    pixel_region: [x, y, w, h],
                    extra: SpriteExtra {
                        flags: 0,
                        screen_mode: markup.screen_mode,
                    },
                });
            }

            if settings.flip_y {
                imageops::flip_vertical_in_place(&mut canvas);
            }

            let mip = MipMap::new(tex_width, tex_height, TextureFormat::RGBA8, canvas.into_raw());
            textures.push(Tex::new_2d(atlas.name(), vec![mip]));
        }

        sprites.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            sprites = sprites.len(),
            textures = textures.len(),
            "packed sprite set"
        );

        Ok(SprSet {
            flags: 0,
            tex_set: TexSet { textures },
            sprites,
        })
    }
}
