use crate::ScreenMode;

/// Per-sprite data stored in the extra table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteExtra {
    pub flags: u32,
    pub screen_mode: ScreenMode,
}

/// A rectangular region of one texture.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sprite {
    pub name: String,
    /// Index into the owning set's textures.
    pub texture_index: i32,
    pub rotate: i32,
    /// Normalized `(u0, v0, u1, v1)` coordinates.
    pub texel_region: [f32; 4],
    /// `(x, y, width, height)` in pixels.
    pub pixel_region: [f32; 4],
    pub extra: SpriteExtra,
}

impl Sprite {
    /// Size in pixels.
    #[inline]
    pub fn size(&self) -> (f32, f32) {
        (self.pixel_region[2], self.pixel_region[3])
    }
}
