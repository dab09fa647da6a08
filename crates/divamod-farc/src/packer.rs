//! Archive writer.

use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};
use divamod_common::align_up;
use flate2::write::GzEncoder;
use flate2::Compression;
use zerocopy::IntoBytes;

use crate::header::FArcHeader;
use crate::Result;

/// Default data alignment.
pub const DEFAULT_ALIGNMENT: u32 = 16;

#[derive(Debug, Clone)]
struct PackedFile {
    name: String,
    data: Vec<u8>,
}

/// Collects files and writes them as one archive.
///
/// # Example
///
/// ```
/// use divamod_farc::{FArc, FArcPacker};
///
/// let mut packer = FArcPacker::new();
/// packer.add_file("spr_logo.bin", vec![1, 2, 3]);
/// let bytes = packer.to_bytes(false)?;
///
/// let farc = FArc::parse(bytes)?;
/// assert_eq!(farc.read_file("spr_logo.bin")?, vec![1, 2, 3]);
/// # Ok::<(), divamod_farc::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FArcPacker {
    files: Vec<PackedFile>,
    alignment: u32,
}

impl FArcPacker {
    pub fn new() -> Self {
        Self::with_alignment(DEFAULT_ALIGNMENT)
    }

    /// Create a packer aligning each file to `alignment` bytes (minimum 1).
    pub fn with_alignment(alignment: u32) -> Self {
        Self {
            files: Vec::new(),
            alignment: alignment.max(1),
        }
    }

    /// Queue a file. Files are stored in insertion order.
    pub fn add_file(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.files.push(PackedFile {
            name: name.into(),
            data,
        });
    }

    /// Number of queued files.
    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Build the archive in memory.
    pub fn to_bytes(&self, compressed: bool) -> Result<Vec<u8>> {
        let alignment = self.alignment as usize;

        let payloads = self
            .files
            .iter()
            .map(|file| {
                if compressed {
                    gzip(&file.data)
                } else {
                    Ok(file.data.clone())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let size_fields = if compressed { 3 } else { 2 };
        let header_len = FArcHeader::SIZE
            + self
                .files
                .iter()
                .map(|file| file.name.len() + 1 + 4 * size_fields)
                .sum::<usize>();

        let header = FArcHeader::new(compressed, (header_len - 8) as u32, self.alignment);

        let mut out = Vec::with_capacity(header_len);
        out.extend_from_slice(header.as_bytes());

        let mut offset = align_up(header_len, alignment);
        for (file, payload) in self.files.iter().zip(&payloads) {
            out.extend_from_slice(file.name.as_bytes());
            out.push(0);
            out.write_u32::<BigEndian>(offset as u32)?;
            if compressed {
                out.write_u32::<BigEndian>(payload.len() as u32)?;
            }
            out.write_u32::<BigEndian>(file.data.len() as u32)?;
            offset = align_up(offset + payload.len(), alignment);
        }
        out.resize(align_up(out.len(), alignment), 0);

        for payload in &payloads {
            out.extend_from_slice(payload);
            out.resize(align_up(out.len(), alignment), 0);
        }

        tracing::debug!(
            files = self.files.len(),
            compressed,
            size = out.len(),
            "packed archive"
        );
        Ok(out)
    }

    /// Build the archive and write it to `path`.
    pub fn write_to_file(&self, path: impl AsRef<Path>, compressed: bool) -> Result<()> {
        let bytes = self.to_bytes(compressed)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for FArcPacker {
    fn default() -> Self {
        Self::new()
    }
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
