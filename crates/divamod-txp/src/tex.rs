//! Texture and mip map records.

use divamod_common::{BinaryReader, BinaryWriter};

use crate::format::{signature, TexSignature, TextureFormat};
use crate::{Error, Result};

/// One mip level of one array slice.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MipMap {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Raw (possibly block-compressed) pixel data.
    pub data: Vec<u8>,
}

impl MipMap {
    /// Create a mip map from its dimensions and raw data.
    pub fn new(width: u32, height: u32, format: TextureFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Size of the pixel data in bytes.
    #[inline]
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    fn read(reader: &mut BinaryReader<'_>) -> divamod_common::Result<Self> {
        reader.expect_signature(signature::MIP_MAP)?;

        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        let format = TextureFormat(reader.read_u32()?);

        // Storage order is authoritative; the index pair is informational.
        let _mip_index = reader.read_u8()?;
        let _array_index = reader.read_u8()?;
        let _padding = reader.read_u16()?;

        let data_size = reader.read_u32()? as usize;
        if data_size > reader.remaining() {
            return Err(divamod_common::Error::BadCount {
                count: data_size,
                remaining: reader.remaining(),
            });
        }
        let data = reader.read_bytes(data_size)?.to_vec();

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    fn write(&self, writer: &mut BinaryWriter<'_>, mip_index: u8, array_index: u8) {
        writer.write_u32(signature::MIP_MAP);
        writer.write_u32(self.width);
        writer.write_u32(self.height);
        writer.write_u32(self.format.0);
        writer.write_u8(mip_index);
        writer.write_u8(array_index);
        writer.write_u8(0);
        writer.write_u8(0);
        writer.write_u32(self.data.len() as u32);
        writer.write_bytes(&self.data);
    }
}

/// A texture: array slices of mip chains, finest level first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tex {
    /// Texture name; empty names are stored as null pointers.
    pub name: String,
    /// Signature tag written for this texture.
    pub signature: TexSignature,
    /// `mip_maps[array_index][mip_index]`
    pub mip_maps: Vec<Vec<MipMap>>,
}

impl Tex {
    /// Create a single-slice 2D texture.
    pub fn new_2d(name: impl Into<String>, mip_maps: Vec<MipMap>) -> Self {
        Self {
            name: name.into(),
            signature: TexSignature::Texture2D,
            mip_maps: vec![mip_maps],
        }
    }

    /// Create a cube map from its faces.
    pub fn new_cube_map(name: impl Into<String>, faces: Vec<Vec<MipMap>>) -> Self {
        Self {
            name: name.into(),
            signature: TexSignature::CubeMap,
            mip_maps: faces,
        }
    }

    /// Number of array slices.
    #[inline]
    pub fn array_size(&self) -> usize {
        self.mip_maps.len()
    }

    /// Number of mip levels per slice, taken from the first slice.
    #[inline]
    pub fn mip_levels(&self) -> usize {
        self.mip_maps.first().map_or(0, Vec::len)
    }

    /// Dimensions of the base level.
    pub fn size(&self) -> (u32, u32) {
        self.base_level().map_or((0, 0), |m| (m.width, m.height))
    }

    /// Format of the base level.
    pub fn format(&self) -> TextureFormat {
        self.base_level().map_or(TextureFormat::UNKNOWN, |m| m.format)
    }

    fn base_level(&self) -> Option<&MipMap> {
        self.mip_maps.first().and_then(|slice| slice.first())
    }

    /// Check that the texture can be encoded.
    pub fn validate(&self) -> Result<()> {
        let array_size = self.array_size();
        let mip_levels = self.mip_levels();

        if array_size > u8::MAX as usize || mip_levels > u8::MAX as usize {
            return Err(Error::TooManyEntries {
                texture: self.name.clone(),
                array_size,
                mip_levels,
            });
        }

        for (slice, mip_maps) in self.mip_maps.iter().enumerate() {
            if mip_maps.len() != mip_levels {
                return Err(Error::MismatchedMipLevels {
                    texture: self.name.clone(),
                    slice,
                    expected: mip_levels,
                    actual: mip_maps.len(),
                });
            }
        }

        Ok(())
    }

    /// Read a texture starting at the current position.
    ///
    /// Mip map pointers are resolved relative to the texture's own start.
    pub fn read(reader: &mut BinaryReader<'_>) -> divamod_common::Result<Self> {
        reader.with_base_offset(|reader| {
            let raw_signature = reader.read_u32()?;
            let signature =
                TexSignature::from_value(raw_signature).ok_or(divamod_common::Error::BadFormat {
                    expected: signature::TEXTURE_2D,
                    actual: raw_signature,
                })?;

            let mip_map_count = reader.read_u32()? as usize;
            let _mip_levels = reader.read_u8()?;
            let array_size = reader.read_u8()? as usize;
            let _depth = reader.read_u8()?;
            let _dimensions = reader.read_u8()?;

            // Cube maps store a flat count across all faces.
            let levels_per_slice = match signature {
                TexSignature::CubeMap => mip_map_count.checked_div(array_size).unwrap_or(0),
                TexSignature::Texture2D => mip_map_count,
            };

            let pointer_count = array_size.saturating_mul(levels_per_slice);
            if pointer_count > reader.remaining() / 4 {
                return Err(divamod_common::Error::BadCount {
                    count: pointer_count,
                    remaining: reader.remaining(),
                });
            }

            let mut mip_maps = Vec::with_capacity(array_size);
            for _ in 0..array_size {
                let mut slice = Vec::with_capacity(levels_per_slice);
                for _ in 0..levels_per_slice {
                    let offset = reader.read_forward_offset()?;
                    slice.push(reader.read_at_offset(offset, true, MipMap::read)?);
                }
                mip_maps.push(slice);
            }

            Ok(Self {
                name: String::new(),
                signature,
                mip_maps,
            })
        })
    }

    /// Write the texture header and schedule its mip maps.
    ///
    /// Call [`validate`](Self::validate) first; slices longer than the first
    /// one are truncated to its length.
    pub fn write<'a>(&'a self, writer: &mut BinaryWriter<'a>) {
        let tex_offset = writer.position();
        let array_size = self.array_size();
        let mip_levels = self.mip_levels();

        let expected = TexSignature::for_array_size(array_size);
        if self.signature != expected {
            tracing::warn!(
                texture = %self.name,
                array_size,
                "writing {:?} signature for a texture shaped like {:?}",
                self.signature,
                expected
            );
        }

        writer.write_u32(self.signature.value());
        writer.write_u32((array_size * mip_levels) as u32);
        writer.write_u8(mip_levels as u8);
        writer.write_u8(array_size as u8);
        writer.write_u8(0x01);
        writer.write_u8(0x01);

        for (array_index, slice) in self.mip_maps.iter().enumerate() {
            for (mip_index, mip_map) in slice.iter().take(mip_levels).enumerate() {
                writer.schedule_write_offset(tex_offset, move |writer| {
                    mip_map.write(writer, mip_index as u8, array_index as u8)
                });
            }
        }
    }
}
