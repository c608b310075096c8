//! Perceptual brightness curves.
//!
//! PWM dimmers use a 14-bit table built from
//! `clamp(0.9151414 * (x / 255 + 0.03)^3, 0, 1) * 16383`; existing
//! installations are calibrated against these exact values. Pixel slices use
//! the same curve reduced to 8 bits.

/// Full-scale duty of a dimmer channel (14-bit PWM resolution)
pub const DIMMER_MAX_DUTY: u16 = 16383;

const CURVE_SCALE: f64 = 0.915_141_4;
const CURVE_OFFSET: f64 = 0.03;

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
const fn dimmer_curve(input: u8) -> u16 {
    let normalized = (input as f64 / 255.0) as f32;
    let base = normalized as f64 + CURVE_OFFSET;
    let mut transformed = (CURVE_SCALE * base * base * base) as f32;
    if transformed > 1.0 {
        transformed = 1.0;
    }
    if transformed < 0.0 {
        transformed = 0.0;
    }
    (transformed * DIMMER_MAX_DUTY as f32 + 0.5) as u16
}

#[allow(clippy::cast_possible_truncation)]
const fn build_dimmer_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < table.len() {
        table[i] = dimmer_curve(i as u8);
        i += 1;
    }
    table
}

#[allow(clippy::cast_possible_truncation)]
const fn build_pixel_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < table.len() {
        let duty = DIMMER_TABLE[i] as u32;
        let max = DIMMER_MAX_DUTY as u32;
        table[i] = ((duty * 255 + max / 2) / max) as u8;
        i += 1;
    }
    table
}

const DIMMER_TABLE: [u16; 256] = build_dimmer_table();

/// 8-bit channel value to 14-bit PWM duty
pub static DIMMER_GAMMA: [u16; 256] = DIMMER_TABLE;

/// 8-bit channel value to 8-bit pixel component
pub static PIXEL_GAMMA: [u8; 256] = build_pixel_table();

/// Gamma-correct a dimmer channel value into a 14-bit duty
#[inline]
pub fn dimmer_gamma(value: u8) -> u16 {
    DIMMER_GAMMA[usize::from(value)]
}

/// Gamma-correct a single pixel component
#[inline]
pub fn pixel_gamma(value: u8) -> u8 {
    PIXEL_GAMMA[usize::from(value)]
}
