use crate::color::{Rgbw, scale_rgbw};
use crate::gamma::pixel_gamma;
use crate::output::{OutputBus, PixelSink, StripId};

/// Color components a slice reads from the DMX frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SliceLayout {
    /// Three channels: red, green, blue
    #[default]
    Rgb,
    /// Four channels: red, green, blue, white
    Rgbw,
}

impl SliceLayout {
    pub const fn components(self) -> u16 {
        match self {
            Self::Rgb => 3,
            Self::Rgbw => 4,
        }
    }
}

/// Contiguous pixel range on one strip that shows a single color
///
/// Consumes three or four color channels, plus a trailing dimmer channel
/// when the slice is dimmable. Incoming colors are gamma corrected, then
/// scaled by the dimmer. Only pixels whose buffered color differs are
/// rewritten.
#[derive(Debug, Clone)]
pub struct PixelSlice {
    strip: StripId,
    first: u16,
    last: u16,
    layout: SliceLayout,
    dimmable: bool,
}

impl PixelSlice {
    /// Create a slice covering pixels `first..=last` of `strip`
    ///
    /// Bounds are swapped if given in reverse order.
    pub const fn new(strip: StripId, first: u16, last: u16, layout: SliceLayout) -> Self {
        let (first, last) = if first <= last {
            (first, last)
        } else {
            (last, first)
        };
        Self {
            strip,
            first,
            last,
            layout,
            dimmable: false,
        }
    }

    /// Add a dimmer channel after the color channels
    #[must_use]
    pub const fn with_dimmer(mut self) -> Self {
        self.dimmable = true;
        self
    }

    pub const fn strip(&self) -> StripId {
        self.strip
    }

    pub const fn first_pixel(&self) -> u16 {
        self.first
    }

    pub const fn last_pixel(&self) -> u16 {
        self.last
    }

    pub const fn layout(&self) -> SliceLayout {
        self.layout
    }

    pub const fn is_dimmable(&self) -> bool {
        self.dimmable
    }

    /// Number of pixels in the slice
    pub const fn len(&self) -> usize {
        (self.last - self.first) as usize + 1
    }

    /// A slice always covers at least one pixel
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub const fn channel_count(&self) -> u16 {
        self.layout.components() + if self.dimmable { 1 } else { 0 }
    }

    pub(crate) fn apply<B: OutputBus + ?Sized>(&mut self, data: &[u8], bus: &mut B) {
        self.apply_with_dimmer(data, None, bus);
    }

    /// Apply color channels, falling back to `shared_dimmer` when the slice
    /// has no dimmer channel of its own
    pub(crate) fn apply_with_dimmer<B: OutputBus + ?Sized>(
        &mut self,
        data: &[u8],
        shared_dimmer: Option<u8>,
        bus: &mut B,
    ) {
        let (color, rest) = match (self.layout, data) {
            (SliceLayout::Rgb, [r, g, b, rest @ ..]) => (Rgbw::new(*r, *g, *b, 0), rest),
            (SliceLayout::Rgbw, [r, g, b, w, rest @ ..]) => (Rgbw::new(*r, *g, *b, *w), rest),
            _ => return,
        };
        let own_dimmer = if self.dimmable {
            rest.first().copied()
        } else {
            None
        };
        let dimmer = own_dimmer.or(shared_dimmer).unwrap_or(u8::MAX);
        self.set_color(color, dimmer, bus);
    }

    /// Fill the whole slice with a gamma-corrected, dimmed color
    pub fn set_color<B: OutputBus + ?Sized>(&self, color: Rgbw, dimmer: u8, bus: &mut B) {
        let Some(sink) = bus.strip(self.strip) else {
            return;
        };
        let color = scale_rgbw(color.map(pixel_gamma), dimmer);
        for index in usize::from(self.first)..=usize::from(self.last) {
            write_pixel(sink, index, color);
        }
    }

    /// Set one pixel of the slice, `pixel` counted from the slice start
    ///
    /// Pixels outside the slice are ignored.
    pub fn set_pixel_color<B: OutputBus + ?Sized>(&self, pixel: usize, color: Rgbw, bus: &mut B) {
        if pixel >= self.len() {
            return;
        }
        let Some(sink) = bus.strip(self.strip) else {
            return;
        };
        write_pixel(sink, usize::from(self.first) + pixel, color.map(pixel_gamma));
    }

    pub(crate) fn switch<B: OutputBus + ?Sized>(&self, on: bool, bus: &mut B) {
        let color = match (on, self.layout) {
            (false, _) => Rgbw::BLACK,
            (true, SliceLayout::Rgb) => Rgbw::new(u8::MAX, u8::MAX, u8::MAX, 0),
            (true, SliceLayout::Rgbw) => Rgbw::WHITE,
        };
        self.set_color(color, u8::MAX, bus);
    }
}

fn write_pixel(sink: &mut dyn PixelSink, index: usize, color: Rgbw) {
    if index < sink.pixel_count() && sink.get_pixel(index) != color {
        sink.set_pixel(index, color);
    }
}
