//! 24-bit pixel colors.

use serde::{Deserialize, Serialize};

const COLOR_MASK: u32 = 0x00ff_ffff;

/// A 24-bit RGB color packed as `0xRRGGBB`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u32", try_from = "u32")]
pub struct Color(u32);

impl Color {
    /// Color reported for cells that have never been written.
    pub const DEFAULT: Self = Self(0);

    /// Wrap a raw value, returning `None` if any bit above 24 is set.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        if raw & !COLOR_MASK != 0 {
            return None;
        }
        Some(Self(raw))
    }

    #[inline]
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    #[must_use]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    #[must_use]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl TryFrom<u32> for Color {
    type Error = String;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| format!("color {raw:#x} does not fit in 24 bits"))
    }
}

impl core::fmt::Display for Color {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        let color = Color::from_rgb(0x12, 0x34, 0x56);
        assert_eq!(color.raw(), 0x12_3456);
        assert_eq!((color.r(), color.g(), color.b()), (0x12, 0x34, 0x56));
        assert_eq!(color.to_string(), "#123456");
    }

    #[test]
    fn test_rejects_wide_values() {
        assert_eq!(Color::new(0x00ff_ffff), Some(Color::from_rgb(255, 255, 255)));
        assert_eq!(Color::new(0x0100_0000), None);
        assert!(serde_json::from_str::<Color>("16777216").is_err());
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(Color::default(), Color::DEFAULT);
        assert_eq!(Color::DEFAULT.raw(), 0);
    }
}
