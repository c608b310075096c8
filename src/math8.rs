//! 8-bit math helpers shared by devices and animations.

/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
///
/// Uses integer math for efficiency on embedded systems.
#[inline]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

/// Blend two 8-bit values
#[inline]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub const fn blend8(a: u8, b: u8, amount_of_b: u8) -> u8 {
    let delta = b as i16 - a as i16;

    let mut partial: u32 = (a as u32) << 16; // a * 65536
    partial = partial.wrapping_add(
        (delta as u32)
            .wrapping_mul(amount_of_b as u32)
            .wrapping_mul(257),
    ); // (b - a) * amount_of_b * 257
    partial = partial.wrapping_add(0x8000); // + 32768 for rounding

    (partial >> 16) as u8
}

/// Convert a `[0, 1]` fraction to a 0-255 blend amount
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fraction8(fraction: f32) -> u8 {
    libm::roundf(fraction.clamp(0.0, 1.0) * 255.0) as u8
}

/// Linear blend of two 8-bit values by a `[0, 1]` progress
///
/// The fractional part is dropped; both endpoints are exact.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn lerp8(from: u8, to: u8, progress: f32) -> u8 {
    let progress = progress.clamp(0.0, 1.0);
    let value = f32::from(from) + (f32::from(to) - f32::from(from)) * progress;
    libm::truncf(value).clamp(0.0, 255.0) as u8
}

/// Map a 0-255 channel value onto `[0, max]`, rounding to the nearest step
#[inline]
pub const fn map8(value: u8, max: u32) -> u32 {
    (value as u32 * max + 127) / 255
}
