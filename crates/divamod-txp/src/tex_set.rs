//! Texture set container.

use divamod_common::{BinaryReader, BinaryWriter};

use crate::format::signature;
use crate::tex::Tex;
use crate::Result;

/// Bits OR'd into the texture count to form the packed info field.
const PACKED_INFO_MASK: u32 = 0x0101_0100;

/// An ordered list of textures.
///
/// Texture names are not stored in the set itself; containers such as
/// sprite sets carry them alongside and assign them after decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TexSet {
    pub textures: Vec<Tex>,
}

impl TexSet {
    /// Read a texture set starting at the current position.
    pub fn read(reader: &mut BinaryReader<'_>) -> divamod_common::Result<Self> {
        reader.with_base_offset(|reader| {
            reader.expect_signature(signature::TEX_SET)?;
            let count = reader.read_u32()? as usize;
            let _packed_info = reader.read_u32()?;

            // Every texture needs at least a 4-byte pointer.
            if count > reader.remaining() / 4 {
                return Err(divamod_common::Error::BadCount {
                    count,
                    remaining: reader.remaining(),
                });
            }

            let mut textures = Vec::with_capacity(count);
            for _ in 0..count {
                let offset = reader.read_forward_offset()?;
                textures.push(reader.read_at_offset(offset, false, Tex::read)?);
            }

            Ok(Self { textures })
        })
    }

    /// Write the set and everything it references, then pad to 16 bytes.
    ///
    /// Tex pointers are relative to the start of the set. The writer is
    /// flushed before returning, so any bodies scheduled earlier by the
    /// caller are laid out here as well.
    pub fn write<'a>(&'a self, writer: &mut BinaryWriter<'a>) {
        let set_offset = writer.position();
        let count = self.textures.len() as u32;

        writer.write_u32(signature::TEX_SET);
        writer.write_u32(count);
        writer.write_u32(count | PACKED_INFO_MASK);

        for tex in &self.textures {
            writer.schedule_write_offset(set_offset, move |writer| tex.write(writer));
        }

        writer.flush_scheduled_writes();
        writer.pad(16);
    }

    /// Check every texture for encodability.
    pub fn validate(&self) -> Result<()> {
        self.textures.iter().try_for_each(Tex::validate)
    }

    /// Encode a standalone texture set.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.validate()?;

        let mut writer = BinaryWriter::new();
        self.write(&mut writer);
        Ok(writer.finish()?)
    }

    /// Decode a standalone texture set.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        Ok(Self::read(&mut reader)?)
    }
}
