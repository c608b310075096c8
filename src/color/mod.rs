mod utils;

use smart_leds::RGB8;

pub use utils::{blend_colors, scale_rgbw};

pub type Rgb = RGB8;

/// Four-component pixel color as stored by a [`crate::PixelSink`].
///
/// RGB strips ignore the white component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgbw {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Rgbw {
    pub const BLACK: Self = Self::new(0, 0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, w: u8) -> Self {
        Self { r, g, b, w }
    }

    /// Apply `f` to every component
    #[must_use]
    pub fn map(self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
            w: f(self.w),
        }
    }

    /// Drop the white component
    pub const fn rgb(self) -> Rgb {
        Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

impl From<Rgb> for Rgbw {
    fn from(color: Rgb) -> Self {
        Self::new(color.r, color.g, color.b, 0)
    }
}

impl From<Rgbw> for Rgb {
    fn from(color: Rgbw) -> Self {
        color.rgb()
    }
}
