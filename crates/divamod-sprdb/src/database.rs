use divamod_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

/// Set-index bit marking an entry as a texture rather than a sprite.
const TEXTURE_FLAG: u16 = 0x1000;
const SET_INDEX_MASK: u16 = 0x0FFF;

/// A sprite or texture entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteDataInfo {
    pub id: u32,
    pub name: String,
    /// Position within the set's sprites or textures, or -1 when unresolved.
    pub index: i32,
}

impl SpriteDataInfo {
    pub fn new(id: u32, name: impl Into<String>, index: i32) -> Self {
        Self {
            id,
            name: name.into(),
            index,
        }
    }
}

/// One sprite set and its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteSetInfo {
    pub id: u32,
    pub name: String,
    pub file_name: String,
    pub textures: Vec<SpriteDataInfo>,
    pub sprites: Vec<SpriteDataInfo>,
}

impl SpriteSetInfo {
    pub fn new(id: u32, name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            file_name: file_name.into(),
            ..Default::default()
        }
    }
}

/// An ordered list of sprite sets.
///
/// # Example
///
/// ```
/// use divamod_sprdb::{SpriteDatabase, SpriteDataInfo, SpriteSetInfo};
///
/// let mut set = SpriteSetInfo::new(85000, "SPR_SEL_PV", "spr_sel_pv.bin");
/// set.sprites.push(SpriteDataInfo::new(85001, "SPR_SEL_PV_ICON", 0));
///
/// let db = SpriteDatabase { sets: vec![set] };
/// let decoded = SpriteDatabase::from_bytes(&db.to_bytes()?)?;
/// assert_eq!(decoded.find_set("SPR_SEL_PV").map(|s| s.id), Some(85000));
/// # Ok::<(), divamod_sprdb::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteDatabase {
    pub sets: Vec<SpriteSetInfo>,
}

impl SpriteDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a set up by name.
    pub fn find_set(&self, name: &str) -> Option<&SpriteSetInfo> {
        self.sets.iter().find(|set| set.name == name)
    }

    /// Total number of sprite and texture entries.
    pub fn entry_count(&self) -> usize {
        self.sets
            .iter()
            .map(|set| set.sprites.len() + set.textures.len())
            .sum()
    }

    /// Check that every field fits its on-disk width.
    pub fn validate(&self) -> Result<()> {
        if self.sets.len() > SET_INDEX_MASK as usize + 1 {
            return Err(Error::TooManySets(self.sets.len()));
        }

        let entries = self
            .sets
            .iter()
            .flat_map(|set| set.sprites.iter().chain(&set.textures));
        for entry in entries {
            if i16::try_from(entry.index).is_err() {
                return Err(Error::IndexOverflow {
                    name: entry.name.clone(),
                    index: entry.index,
                });
            }
        }
        Ok(())
    }

    /// Read a database starting at the current position.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let start = reader.position();
        let entry_count = reader.read_u32()? as usize;
        let entries_offset = reader.read_i32()?;
        let set_count = reader.read_u32()? as usize;
        let sets_offset = reader.read_i32()?;

        let mut sets = Vec::new();
        if set_count > 0 {
            // id, name, file name, index
            check_count(reader, set_count, 16)?;
            let offset = forward(sets_offset, start + 12)?;
            sets = reader.read_at_offset(offset, false, |reader| {
                (0..set_count)
                    .map(|_| {
                        let id = reader.read_u32()?;
                        let name = reader.read_string_offset()?;
                        let file_name = reader.read_string_offset()?;
                        let _index = reader.read_u32()?;
                        Ok(SpriteSetInfo::new(id, name, file_name))
                    })
                    .collect::<divamod_common::Result<Vec<_>>>()
            })?;
        }

        if entry_count > 0 {
            // id, name, index, set index
            check_count(reader, entry_count, 12)?;
            let offset = forward(entries_offset, start + 4)?;
            let entries = reader.read_at_offset(offset, false, |reader| {
                (0..entry_count)
                    .map(|_| {
                        let id = reader.read_u32()?;
                        let name = reader.read_string_offset()?;
                        let index = reader.read_i16()?;
                        let set_index = reader.read_u16()?;
                        Ok((SpriteDataInfo::new(id, name, index.into()), set_index))
                    })
                    .collect::<divamod_common::Result<Vec<_>>>()
            })?;

            let set_count = sets.len();
            for (entry, raw_set_index) in entries {
                let set_index = (raw_set_index & SET_INDEX_MASK) as usize;
                let set = sets.get_mut(set_index).ok_or(Error::SetIndexOutOfRange {
                    name: entry.name.clone(),
                    set_index,
                    set_count,
                })?;

                if raw_set_index & TEXTURE_FLAG != 0 {
                    set.textures.push(entry);
                } else {
                    set.sprites.push(entry);
                }
            }
        }

        tracing::debug!(sets = sets.len(), entries = entry_count, "read sprite database");
        Ok(Self { sets })
    }

    /// Write the database.
    ///
    /// Call [`validate`](Self::validate) first; out-of-range indices are
    /// truncated.
    pub fn write<'a>(&'a self, writer: &mut BinaryWriter<'a>) {
        writer.write_u32(self.entry_count() as u32);
        writer.schedule_write_offset(0, move |writer| {
            for (set_index, set) in self.sets.iter().enumerate() {
                let set_index = set_index as u16 & SET_INDEX_MASK;
                write_entries(writer, &set.sprites, set_index);
                write_entries(writer, &set.textures, set_index | TEXTURE_FLAG);
            }
        });

        writer.write_u32(self.sets.len() as u32);
        writer.schedule_write_offset(0, move |writer| {
            for (index, set) in self.sets.iter().enumerate() {
                writer.write_u32(set.id);
                writer.schedule_write_string_offset(&set.name);
                writer.schedule_write_string_offset(&set.file_name);
                writer.write_u32(index as u32);
            }
        });

        writer.flush_scheduled_writes();
        writer.pad(16);
        writer.flush_scheduled_strings();
        writer.pad(16);
    }

    /// Validate and encode the database as a standalone file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.validate()?;

        let mut writer = BinaryWriter::new();
        self.write(&mut writer);
        Ok(writer.finish()?)
    }

    /// Decode a standalone database file.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read(&mut BinaryReader::new(data))
    }
}

fn write_entries<'a>(writer: &mut BinaryWriter<'a>, entries: &'a [SpriteDataInfo], set_index: u16) {
    for entry in entries {
        writer.write_u32(entry.id);
        writer.schedule_write_string_offset(&entry.name);
        writer.write_i16(entry.index as i16);
        writer.write_u16(set_index);
    }
}

fn forward(offset: i32, position: usize) -> divamod_common::Result<usize> {
    if offset <= 0 {
        return Err(divamod_common::Error::BadPointer {
            offset: offset.into(),
            position,
        });
    }
    Ok(offset as usize)
}

fn check_count(
    reader: &BinaryReader<'_>,
    count: usize,
    record_size: usize,
) -> divamod_common::Result<()> {
    if count > reader.len() / record_size {
        return Err(divamod_common::Error::BadCount {
            count,
            remaining: reader.len(),
        });
    }
    Ok(())
}
