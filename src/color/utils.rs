use crate::{
    color::{Rgb, Rgbw},
    math8::{blend8, scale8},
};

/// Blend two RGB colors
///
/// # Arguments
/// * `a` - First color
/// * `b` - Second color
/// * `amount_of_b` - Blend factor (0 = all a, 255 = all b)
#[inline]
pub fn blend_colors(a: Rgb, b: Rgb, amount_of_b: u8) -> Rgb {
    Rgb {
        r: blend8(a.r, b.r, amount_of_b),
        g: blend8(a.g, b.g, amount_of_b),
        b: blend8(a.b, b.b, amount_of_b),
    }
}

/// Scale every component by `scale` (0-255 = 0.0-1.0)
#[inline]
pub fn scale_rgbw(color: Rgbw, scale: u8) -> Rgbw {
    if scale == u8::MAX {
        return color;
    }
    color.map(|c| scale8(c, scale))
}
