use std::fmt;

/// Target screen mode a sprite was authored for.
///
/// Kept as the raw u32 so values outside the known range survive a round
/// trip.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ScreenMode(pub u32);

const MODES: [(&str, u32, u32); 19] = [
    ("QVGA", 320, 240),
    ("VGA", 640, 480),
    ("SVGA", 800, 600),
    ("XGA", 1024, 768),
    ("SXGA", 1280, 1024),
    ("SXGA+", 1400, 1050),
    ("UXGA", 1600, 1200),
    ("WVGA", 800, 480),
    ("WSVGA", 1024, 600),
    ("WXGA", 1280, 768),
    ("WXGA (1360)", 1360, 768),
    ("WUXGA", 1920, 1200),
    ("WQXGA", 2560, 1536),
    ("HDTV720", 1280, 720),
    ("HDTV1080", 1920, 1080),
    ("WQHD", 2560, 1440),
    ("HVGA", 480, 272),
    ("qHD", 960, 544),
    ("Custom", 0, 0),
];

impl ScreenMode {
    pub const QVGA: Self = Self(0);
    pub const VGA: Self = Self(1);
    pub const SVGA: Self = Self(2);
    pub const XGA: Self = Self(3);
    pub const SXGA: Self = Self(4);
    pub const SXGA_PLUS: Self = Self(5);
    pub const UXGA: Self = Self(6);
    pub const WVGA: Self = Self(7);
    pub const WSVGA: Self = Self(8);
    pub const WXGA: Self = Self(9);
    pub const WXGA_1360: Self = Self(10);
    pub const WUXGA: Self = Self(11);
    pub const WQXGA: Self = Self(12);
    pub const HDTV720: Self = Self(13);
    pub const HDTV1080: Self = Self(14);
    pub const WQHD: Self = Self(15);
    pub const HVGA: Self = Self(16);
    pub const QHD: Self = Self(17);
    pub const CUSTOM: Self = Self(18);

    /// Display name for known modes.
    pub fn name(self) -> Option<&'static str> {
        MODES.get(self.0 as usize).map(|&(name, _, _)| name)
    }

    /// Nominal resolution; `None` for unknown values and `(0, 0)` for custom.
    pub fn resolution(self) -> Option<(u32, u32)> {
        MODES
            .get(self.0 as usize)
            .map(|&(_, width, height)| (width, height))
    }
}

impl fmt::Debug for ScreenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "ScreenMode({})", self.0),
        }
    }
}

impl fmt::Display for ScreenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_modes() {
        assert_eq!(ScreenMode::HDTV1080.resolution(), Some((1920, 1080)));
        assert_eq!(ScreenMode::QHD.name(), Some("qHD"));
        assert_eq!(ScreenMode::CUSTOM.resolution(), Some((0, 0)));
    }

    #[test]
    fn test_unknown_mode_is_preserved() {
        let mode = ScreenMode(42);
        assert_eq!(mode.resolution(), None);
        assert_eq!(mode.to_string(), "ScreenMode(42)");
    }
}
