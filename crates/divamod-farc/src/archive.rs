//! Archive reader.

use std::fs;
use std::io::Read;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use flate2::read::GzDecoder;
use zerocopy::FromBytes;

use crate::header::FArcHeader;
use crate::{Error, Result};

/// One file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FArcEntry {
    pub name: String,
    pub offset: usize,
    /// Stored size; equal to `size` for uncompressed archives.
    pub compressed_size: usize,
    pub size: usize,
}

/// A parsed `FArc` or `FArC` archive held in memory.
#[derive(Debug, Clone)]
pub struct FArc {
    data: Vec<u8>,
    compressed: bool,
    alignment: u32,
    entries: Vec<FArcEntry>,
}

impl FArc {
    /// Read and parse an archive from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(fs::read(path)?)
    }

    /// Parse an archive from its bytes.
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let (header, _) = FArcHeader::read_from_prefix(&data)
            .map_err(|_| Error::TruncatedHeader(data.len()))?;

        if header.signature != FArcHeader::UNCOMPRESSED
            && header.signature != FArcHeader::COMPRESSED
        {
            return Err(Error::UnsupportedSignature(
                String::from_utf8_lossy(&header.signature).into_owned(),
            ));
        }

        let compressed = header.is_compressed();
        let header_end = (header.header_size.get() as usize).saturating_add(8);
        if header_end > data.len() {
            return Err(Error::TruncatedHeader(data.len()));
        }

        let mut entries = Vec::new();
        let mut cursor = FArcHeader::SIZE;
        while cursor < header_end {
            let table = &data[cursor..header_end];
            let name_len = memchr::memchr(0, table).ok_or(Error::TruncatedHeader(cursor))?;
            let name = String::from_utf8_lossy(&table[..name_len]).into_owned();

            let size_fields = if compressed { 3 } else { 2 };
            let fields_start = name_len + 1;
            let fields_end = fields_start + 4 * size_fields;
            let fields = table
                .get(fields_start..fields_end)
                .ok_or(Error::TruncatedHeader(cursor + fields_start))?;

            let offset = BigEndian::read_u32(&fields[0..4]) as usize;
            let compressed_size = BigEndian::read_u32(&fields[4..8]) as usize;
            let size = if compressed {
                BigEndian::read_u32(&fields[8..12]) as usize
            } else {
                compressed_size
            };

            let end = offset.saturating_add(compressed_size);
            if end > data.len() {
                return Err(Error::EntryOutOfBounds {
                    name,
                    offset,
                    end,
                    len: data.len(),
                });
            }

            entries.push(FArcEntry {
                name,
                offset,
                compressed_size,
                size,
            });
            cursor += fields_end;
        }

        tracing::debug!(entries = entries.len(), compressed, "parsed archive");
        Ok(Self {
            data,
            compressed,
            alignment: header.alignment.get(),
            entries,
        })
    }

    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    #[inline]
    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    #[inline]
    pub fn entries(&self) -> &[FArcEntry] {
        &self.entries
    }

    /// Find an entry by name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&FArcEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Read the contents of an entry, decompressing if needed.
    pub fn read(&self, entry: &FArcEntry) -> Result<Vec<u8>> {
        let stored = &self.data[entry.offset..entry.offset + entry.compressed_size];
        if !self.compressed {
            return Ok(stored.to_vec());
        }

        // Declared sizes are untrusted; cap the hint.
        let hint = entry.size.min(entry.compressed_size.saturating_mul(8));
        let mut output = Vec::with_capacity(hint);
        GzDecoder::new(stored)
            .read_to_end(&mut output)
            .map_err(|e| Error::Decompression(e.to_string()))?;
        Ok(output)
    }

    /// Read the contents of the entry called `name`.
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .find(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        self.read(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FArcPacker;

    fn sample(compressed: bool) -> Vec<u8> {
        let mut packer = FArcPacker::new();
        packer.add_file("spr_sel_pv001.bin", b"sprite set".to_vec());
        packer.add_file("mod_spr_db.bin", vec![0x55; 300]);
        packer.to_bytes(compressed).unwrap()
    }

    #[test]
    fn test_parse_uncompressed() {
        let farc = FArc::parse(sample(false)).unwrap();
        assert!(!farc.is_compressed());
        assert_eq!(farc.alignment(), 16);
        assert_eq!(farc.entries().len(), 2);
        assert_eq!(farc.read_file("SPR_SEL_PV001.BIN").unwrap(), b"sprite set");
    }

    #[test]
    fn test_parse_compressed() {
        let farc = FArc::parse(sample(true)).unwrap();
        assert!(farc.is_compressed());
        let entry = farc.find("mod_spr_db.bin").unwrap();
        assert_eq!(entry.size, 300);
        assert_eq!(farc.read(entry).unwrap(), vec![0x55; 300]);
    }

    #[test]
    fn test_rejects_extended_archives() {
        let mut bytes = sample(false);
        bytes[0..4].copy_from_slice(b"FARC");
        assert!(matches!(
            FArc::parse(bytes),
            Err(Error::UnsupportedSignature(sig)) if sig == "FARC"
        ));
    }

    #[test]
    fn test_rejects_out_of_bounds_entry() {
        let mut bytes = sample(false);
        bytes.truncate(64);
        assert!(matches!(
            FArc::parse(bytes),
            Err(Error::EntryOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_declared_size_does_not_drive_allocation() {
        let mut bytes = sample(true);
        // First entry: name at 12, then offset, compressed size, size.
        let size_field = 12 + "spr_sel_pv001.bin\0".len() + 8;
        bytes[size_field..size_field + 4].copy_from_slice(&u32::MAX.to_be_bytes());

        let farc = FArc::parse(bytes).unwrap();
        let entry = farc.find("spr_sel_pv001.bin").unwrap();
        assert_eq!(entry.size, u32::MAX as usize);
        assert_eq!(farc.read(entry).unwrap(), b"sprite set");
    }

    #[test]
    fn test_missing_entry() {
        let farc = FArc::parse(sample(false)).unwrap();
        assert!(matches!(
            farc.read_file("nope.bin"),
            Err(Error::EntryNotFound(_))
        ));
    }
}
