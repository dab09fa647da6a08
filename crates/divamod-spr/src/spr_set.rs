//! Sprite set container.

use divamod_common::{BinaryReader, BinaryWriter};
use divamod_txp::TexSet;

use crate::{Error, Result, ScreenMode, Sprite, SpriteExtra};

/// Size of one sprite record: two i32 and two f32x4.
const SPRITE_RECORD_SIZE: usize = 40;

/// A sprite set: textures plus the sprites cut from them.
///
/// Texture names are stored on the textures of [`tex_set`](Self::tex_set).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SprSet {
    pub flags: u32,
    pub tex_set: TexSet,
    pub sprites: Vec<Sprite>,
}

impl SprSet {
    /// Create an empty sprite set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of textures.
    #[inline]
    pub fn texture_count(&self) -> usize {
        self.tex_set.textures.len()
    }

    /// Find a sprite by exact name.
    pub fn sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.name == name)
    }

    /// Check that every sprite references an existing texture.
    pub fn validate(&self) -> Result<()> {
        let texture_count = self.texture_count();
        for sprite in &self.sprites {
            let in_range = usize::try_from(sprite.texture_index)
                .is_ok_and(|index| index < texture_count);
            if !in_range {
                return Err(Error::TextureIndexOutOfRange {
                    sprite: sprite.name.clone(),
                    index: sprite.texture_index,
                    texture_count,
                });
            }
        }
        self.tex_set.validate()?;
        Ok(())
    }

    /// Read a sprite set starting at the current position.
    ///
    /// Texture indices are not range-checked here; call
    /// [`validate`](Self::validate) when that matters.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let start = reader.position();

        let flags = reader.read_u32()?;
        let tex_set_offset = reader.read_i32()?;
        let texture_count = reader.read_u32()? as usize;
        let sprite_count = reader.read_u32()? as usize;
        let sprites_offset = reader.read_i32()?;
        let texture_names_offset = reader.read_i32()?;
        let sprite_names_offset = reader.read_i32()?;
        let extra_offset = reader.read_i32()?;

        tracing::debug!(flags, texture_count, sprite_count, "reading sprite set");

        let mut tex_set = TexSet::default();
        if texture_count > 0 {
            let offset = positive(tex_set_offset, start + 4)?;
            tex_set = reader.read_at_offset(offset, false, TexSet::read)?;

            if texture_names_offset > 0 && tex_set.textures.len() == texture_count {
                let names = read_names(reader, texture_names_offset as usize, texture_count)?;
                for (tex, name) in tex_set.textures.iter_mut().zip(names) {
                    tex.name = name;
                }
            }
        }

        let mut sprites = Vec::new();
        if sprite_count > 0 {
            let offset = positive(sprites_offset, start + 16)?;
            let extra_offset = positive(extra_offset, start + 28)?;

            if sprite_count > reader.len() / SPRITE_RECORD_SIZE {
                return Err(divamod_common::Error::BadCount {
                    count: sprite_count,
                    remaining: reader.len(),
                }
                .into());
            }

            sprites = reader.read_at_offset(offset, false, |reader| {
                (0..sprite_count)
                    .map(|_| {
                        Ok(Sprite {
                            texture_index: reader.read_i32()?,
                            rotate: reader.read_i32()?,
                            texel_region: reader.read_f32x4()?,
                            pixel_region: reader.read_f32x4()?,
                            ..Default::default()
                        })
                    })
                    .collect::<divamod_common::Result<Vec<_>>>()
            })?;

            if sprite_names_offset > 0 {
                let names = read_names(reader, sprite_names_offset as usize, sprite_count)?;
                for (sprite, name) in sprites.iter_mut().zip(names) {
                    sprite.name = name;
                }
            }

            reader.read_at_offset(extra_offset, false, |reader| {
                for sprite in sprites.iter_mut() {
                    sprite.extra = SpriteExtra {
                        flags: reader.read_u32()?,
                        screen_mode: ScreenMode(reader.read_u32()?),
                    };
                }
                Ok(())
            })?;
        }

        Ok(Self {
            flags,
            tex_set,
            sprites,
        })
    }

    /// Write the set.
    ///
    /// Header, then sprite records, texture names, sprite names and extra
    /// data; then the string pool; then the texture set, whose absolute
    /// address is patched into the header. Each stage ends on a 16-byte
    /// boundary.
    pub fn write<'a>(&'a self, writer: &mut BinaryWriter<'a>) {
        writer.write_u32(self.flags);
        let tex_set_slot = writer.reserve_u32();
        writer.write_u32(self.texture_count() as u32);
        writer.write_u32(self.sprites.len() as u32);

        writer.schedule_write_offset(0, move |writer| {
            for sprite in &self.sprites {
                writer.write_i32(sprite.texture_index);
                writer.write_i32(sprite.rotate);
                writer.write_f32x4(&sprite.texel_region);
                writer.write_f32x4(&sprite.pixel_region);
            }
        });

        writer.schedule_write_offset(0, move |writer| {
            for tex in &self.tex_set.textures {
                if tex.name.is_empty() {
                    writer.write_i32(0);
                } else {
                    writer.schedule_write_string_offset(&tex.name);
                }
            }
        });

        writer.schedule_write_offset(0, move |writer| {
            for sprite in &self.sprites {
                writer.schedule_write_string_offset(&sprite.name);
            }
        });

        writer.schedule_write_offset(0, move |writer| {
            for sprite in &self.sprites {
                writer.write_u32(sprite.extra.flags);
                writer.write_u32(sprite.extra.screen_mode.0);
            }
        });

        writer.flush_scheduled_writes();
        writer.pad(16);
        writer.flush_scheduled_strings();
        writer.pad(16);

        let tex_set_offset = writer.position();
        self.tex_set.write(writer);
        writer.patch_i32(tex_set_slot, tex_set_offset as i32);
    }

    /// Validate and encode the set as a standalone file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.validate()?;

        let mut writer = BinaryWriter::new();
        self.write(&mut writer);
        Ok(writer.finish()?)
    }

    /// Decode a standalone sprite set file.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read(&mut BinaryReader::new(data))
    }
}

fn positive(offset: i32, position: usize) -> divamod_common::Result<usize> {
    if offset <= 0 {
        return Err(divamod_common::Error::BadPointer {
            offset: offset.into(),
            position,
        });
    }
    Ok(offset as usize)
}

fn read_names(
    reader: &mut BinaryReader<'_>,
    offset: usize,
    count: usize,
) -> divamod_common::Result<Vec<String>> {
    reader.read_at_offset(offset, false, |reader| {
        (0..count).map(|_| reader.read_string_offset()).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use divamod_txp::{MipMap, Tex, TextureFormat};

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    fn texture(name: &str, fill: u8) -> Tex {
        Tex::new_2d(
            name,
            vec![MipMap::new(4, 4, TextureFormat::RGBA8, vec![fill; 64])],
        )
    }

    fn sprite(name: &str, texture_index: i32) -> Sprite {
        Sprite {
            name: name.to_string(),
            texture_index,
            rotate: 0,
            texel_region: [0.0, 0.0, 0.5, 0.25],
            pixel_region: [0.0, 0.0, 2.0, 1.0],
            extra: SpriteExtra {
                flags: 0,
                screen_mode: ScreenMode::HDTV1080,
            },
        }
    }

    fn sample() -> SprSet {
        SprSet {
            flags: 0,
            tex_set: TexSet {
                textures: vec![texture("MERGE_NOCOMP_000", 1), texture("", 2)],
            },
            sprites: vec![sprite("ICON_A", 0), sprite("ICON_B", 1), sprite("ICON_C", 0)],
        }
    }

    #[test]
    fn test_round_trip() {
        let set = sample();
        let decoded = SprSet::from_bytes(&set.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, set);
        assert_eq!(decoded.sprite("ICON_B").map(|s| s.texture_index), Some(1));
    }

    #[test]
    fn test_stage_layout() {
        let bytes = sample().to_bytes().unwrap();

        // Header (32), sprites (3 x 40), texture names (2 x 4),
        // sprite names (3 x 4), extra (3 x 8).
        assert_eq!(read_u32(&bytes, 16), 32);
        assert_eq!(read_u32(&bytes, 20), 152);
        assert_eq!(read_u32(&bytes, 24), 160);
        assert_eq!(read_u32(&bytes, 28), 172);

        // The unnamed texture has a null name pointer.
        assert_eq!(read_u32(&bytes, 156), 0);

        // Strings start on the first 16-byte boundary after the extra data.
        let first_string = read_u32(&bytes, 152) as usize;
        assert_eq!(first_string, 208);
        assert_eq!(&bytes[first_string..first_string + 17], b"MERGE_NOCOMP_000\0");

        // The texture set comes last, on a 16-byte boundary.
        let tex_set = read_u32(&bytes, 4) as usize;
        assert_eq!(tex_set % 16, 0);
        assert!(tex_set > first_string);
        assert_eq!(&bytes[tex_set..tex_set + 4], b"TXP\x03");
        assert_eq!(bytes.len() % 16, 0);
    }

    #[test]
    fn test_sprites_without_textures() {
        let set = SprSet {
            flags: 0,
            tex_set: TexSet::default(),
            sprites: vec![sprite("A", 0), sprite("B", 0)],
        };

        let mut writer = BinaryWriter::new();
        set.write(&mut writer);
        let bytes = writer.finish().unwrap();
        assert_eq!(read_u32(&bytes, 8), 0);

        let decoded = SprSet::from_bytes(&bytes).unwrap();
        assert!(decoded.tex_set.textures.is_empty());
        assert_eq!(decoded.sprites.len(), 2);
        assert_eq!(decoded.sprites[1].name, "B");
    }

    #[test]
    fn test_validate_rejects_out_of_range_texture() {
        let mut set = sample();
        set.sprites[2].texture_index = 2;
        assert!(matches!(
            set.to_bytes(),
            Err(Error::TextureIndexOutOfRange { index: 2, texture_count: 2, .. })
        ));

        set.sprites[2].texture_index = -1;
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_missing_sprite_pointer() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[16..20].copy_from_slice(&0i32.to_le_bytes());
        assert!(matches!(
            SprSet::from_bytes(&bytes),
            Err(Error::Common(divamod_common::Error::BadPointer { offset: 0, position: 16 }))
        ));
    }

    #[test]
    fn test_missing_tex_set_pointer() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[4..8].copy_from_slice(&0i32.to_le_bytes());
        assert!(matches!(
            SprSet::from_bytes(&bytes),
            Err(Error::Common(divamod_common::Error::BadPointer { position: 4, .. }))
        ));
    }

    #[test]
    fn test_tex_set_errors_propagate() {
        let mut bytes = sample().to_bytes().unwrap();
        let tex_set = read_u32(&bytes, 4) as usize;
        bytes[tex_set] = b'X';
        assert!(matches!(
            SprSet::from_bytes(&bytes),
            Err(Error::Common(divamod_common::Error::BadFormat { .. }))
        ));
    }
}
