//! Signatures and pixel format tags.

use std::fmt;

/// Four-byte TXP signatures, read and written as little-endian u32.
pub mod signature {
    /// `"TXP\x02"`
    pub const MIP_MAP: u32 = 0x0250_5854;
    /// `"TXP\x03"`
    pub const TEX_SET: u32 = 0x0350_5854;
    /// `"TXP\x04"`
    pub const TEXTURE_2D: u32 = 0x0450_5854;
    /// `"TXP\x05"`
    pub const CUBE_MAP: u32 = 0x0550_5854;
}

/// Kind of a texture record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TexSignature {
    /// A plain texture, normally one array slice.
    #[default]
    Texture2D,
    /// A cube map, normally six array slices.
    CubeMap,
}

impl TexSignature {
    /// The on-disk signature value.
    pub const fn value(self) -> u32 {
        match self {
            Self::Texture2D => signature::TEXTURE_2D,
            Self::CubeMap => signature::CUBE_MAP,
        }
    }

    /// Parse an on-disk signature value.
    pub const fn from_value(value: u32) -> Option<Self> {
        match value {
            signature::TEXTURE_2D => Some(Self::Texture2D),
            signature::CUBE_MAP => Some(Self::CubeMap),
            _ => None,
        }
    }

    /// The kind a texture with `array_size` slices would normally have.
    pub const fn for_array_size(array_size: usize) -> Self {
        if array_size == 6 {
            Self::CubeMap
        } else {
            Self::Texture2D
        }
    }
}

/// Pixel format of a mip map.
///
/// Stored as the raw u32 so unknown values survive a round trip.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TextureFormat(pub u32);

impl TextureFormat {
    pub const UNKNOWN: Self = Self(0xFFFF_FFFF);
    pub const A8: Self = Self(0);
    pub const RGB8: Self = Self(1);
    pub const RGBA8: Self = Self(2);
    pub const RGB5: Self = Self(3);
    pub const RGB5_A1: Self = Self(4);
    pub const RGBA4: Self = Self(5);
    pub const DXT1: Self = Self(6);
    pub const DXT1A: Self = Self(7);
    pub const DXT3: Self = Self(8);
    pub const DXT5: Self = Self(9);
    pub const RGTC1: Self = Self(10);
    pub const RGTC2: Self = Self(11);
    pub const L8: Self = Self(12);
    pub const L8A8: Self = Self(13);

    /// Human readable name for known formats.
    pub const fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "A8",
            1 => "RGB8",
            2 => "RGBA8",
            3 => "RGB5",
            4 => "RGB5_A1",
            5 => "RGBA4",
            6 => "DXT1",
            7 => "DXT1a",
            8 => "DXT3",
            9 => "DXT5",
            10 => "RGTC1",
            11 => "RGTC2",
            12 => "L8",
            13 => "L8A8",
            _ => return None,
        })
    }
}

impl fmt::Debug for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "TextureFormat({:#x})", self.0),
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures_spell_txp() {
        assert_eq!(&signature::MIP_MAP.to_le_bytes(), b"TXP\x02");
        assert_eq!(&signature::TEX_SET.to_le_bytes(), b"TXP\x03");
        assert_eq!(&signature::TEXTURE_2D.to_le_bytes(), b"TXP\x04");
        assert_eq!(&signature::CUBE_MAP.to_le_bytes(), b"TXP\x05");
    }

    #[test]
    fn test_unknown_format_debug() {
        assert_eq!(format!("{:?}", TextureFormat::RGBA8), "RGBA8");
        assert_eq!(format!("{:?}", TextureFormat(0x42)), "TextureFormat(0x42)");
    }
}
