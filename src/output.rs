//! Hardware output abstraction.
//!
//! Devices never talk to peripherals directly. They stage pixel colors, PWM
//! duties and servo angles on an [`OutputBus`]; the commit context later calls
//! [`OutputBus::flush`] to shift everything out in one go.

use smart_leds::SmartLedsWrite;

use crate::color::{Rgb, Rgbw};

/// Index of a physical LED strip on the [`OutputBus`]
pub type StripId = u8;

/// Index of a PWM or servo pin on the [`OutputBus`]
pub type OutputPin = u8;

/// Buffered access to the pixels of one physical strip
///
/// Implement this trait for each strip driver. Reads and writes only touch
/// the buffer; [`PixelSink::flush`] pushes it to the hardware.
pub trait PixelSink {
    /// Number of pixels on the strip
    fn pixel_count(&self) -> usize;

    /// Read back a buffered pixel; out-of-range indices read as black
    fn get_pixel(&self, index: usize) -> Rgbw;

    /// Buffer a pixel color; out-of-range indices are ignored
    fn set_pixel(&mut self, index: usize, color: Rgbw);

    /// Write the buffer to the strip
    fn flush(&mut self);
}

/// The set of outputs written by one hardware flush
///
/// Implemented by the firmware for its peripherals. The bus is handed to the
/// flush context by value (see [`crate::CommitCoordinator`]), so an
/// implementation may be `&'static mut` to a statically allocated struct.
pub trait OutputBus {
    /// Pixel buffer of a strip, `None` if no such strip exists
    fn strip(&mut self, id: StripId) -> Option<&mut dyn PixelSink>;

    /// Stage a 14-bit PWM duty for a dimmer pin
    fn set_duty(&mut self, pin: OutputPin, duty: u16);

    /// Stage a servo angle in degrees
    fn set_angle(&mut self, pin: OutputPin, angle: u16);

    /// Write all staged state to the hardware
    fn flush(&mut self);
}

impl<B: OutputBus + ?Sized> OutputBus for &mut B {
    fn strip(&mut self, id: StripId) -> Option<&mut dyn PixelSink> {
        (**self).strip(id)
    }

    fn set_duty(&mut self, pin: OutputPin, duty: u16) {
        (**self).set_duty(pin, duty);
    }

    fn set_angle(&mut self, pin: OutputPin, angle: u16) {
        (**self).set_angle(pin, angle);
    }

    fn flush(&mut self) {
        (**self).flush();
    }
}

/// Buffered [`PixelSink`] over a `smart-leds` driver
///
/// Keeps `N` pixels in RAM and writes them with
/// [`SmartLedsWrite::write`] on flush. Driver errors are logged and the
/// buffer is kept, so the next flush retries.
pub struct SmartLedStrip<W, const N: usize> {
    writer: W,
    pixels: [Rgbw; N],
    dirty: bool,
}

impl<W, const N: usize> SmartLedStrip<W, N>
where
    W: SmartLedsWrite,
    Rgb: Into<W::Color>,
{
    /// Create a strip with all pixels off
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            pixels: [Rgbw::BLACK; N],
            dirty: true,
        }
    }

    /// Get the buffered pixels
    pub fn pixels(&self) -> &[Rgbw] {
        &self.pixels
    }
}

impl<W, const N: usize> PixelSink for SmartLedStrip<W, N>
where
    W: SmartLedsWrite,
    Rgb: Into<W::Color>,
{
    fn pixel_count(&self) -> usize {
        N
    }

    fn get_pixel(&self, index: usize) -> Rgbw {
        self.pixels.get(index).copied().unwrap_or_default()
    }

    fn set_pixel(&mut self, index: usize, color: Rgbw) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            if *pixel != color {
                *pixel = color;
                self.dirty = true;
            }
        }
    }

    fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        if self
            .writer
            .write(self.pixels.iter().map(|pixel| pixel.rgb()))
            .is_err()
        {
            log::error!("strip write failed, keeping buffer for the next flush");
            return;
        }
        self.dirty = false;
    }
}
