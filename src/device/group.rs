use heapless::Vec;

use super::{DimmerMode, PixelSlice, SliceLayout};
use crate::output::{OutputBus, StripId};

/// Maximum number of slices on one strip
pub const MAX_GROUP_SLICES: usize = 16;

/// Strip wiring: which pixels form which slices
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StripConfig {
    pub strip: StripId,
    pub pixel_count: u16,
    #[cfg_attr(feature = "serde", serde(default))]
    pub layout: SliceLayout,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dimmer: DimmerMode,
    /// First pixel of every slice; each slice ends right before the next
    /// one starts. Empty means one slice over the whole strip.
    #[cfg_attr(feature = "serde", serde(default))]
    pub slices: Vec<u16, MAX_GROUP_SLICES>,
}

/// All slices of one strip behind a single channel window
///
/// Children consume consecutive channels in order. With
/// [`DimmerMode::Single`] one trailing channel dims every child that has no
/// dimmer of its own.
#[derive(Debug, Clone)]
pub struct DeviceGroup {
    slices: Vec<PixelSlice, MAX_GROUP_SLICES>,
    shared_dimmer: bool,
}

impl DeviceGroup {
    /// Create an empty group
    pub const fn new(shared_dimmer: bool) -> Self {
        Self {
            slices: Vec::new(),
            shared_dimmer,
        }
    }

    /// Split a strip into slices as described by `config`
    ///
    /// Slice starts past the end of the strip, or not above the previous
    /// start, are dropped so no two slices share a pixel.
    pub fn from_strip(config: &StripConfig) -> Self {
        let mut group = Self::new(config.dimmer == DimmerMode::Single);
        if config.pixel_count == 0 {
            return group;
        }
        let last_pixel = config.pixel_count - 1;
        let starts = slice_starts(config, last_pixel);
        for (i, &first) in starts.iter().enumerate() {
            let last = starts.get(i + 1).map_or(last_pixel, |next| next - 1);
            let mut slice = PixelSlice::new(config.strip, first, last, config.layout);
            if config.dimmer == DimmerMode::PerSlice {
                slice = slice.with_dimmer();
            }
            // Capacity equals the config's slice capacity
            let _ = group.slices.push(slice);
        }
        group
    }

    /// Append a slice, handing it back if the group is full
    pub fn push(&mut self, slice: PixelSlice) -> Result<(), PixelSlice> {
        self.slices.push(slice)
    }

    pub fn slices(&self) -> &[PixelSlice] {
        &self.slices
    }

    /// Take the group apart, e.g. to drive its slices from an animation
    pub fn into_slices(self) -> Vec<PixelSlice, MAX_GROUP_SLICES> {
        self.slices
    }

    pub const fn has_shared_dimmer(&self) -> bool {
        self.shared_dimmer
    }

    pub fn channel_count(&self) -> u16 {
        let children: u16 = self.slices.iter().map(PixelSlice::channel_count).sum();
        children + u16::from(self.shared_dimmer)
    }

    pub(crate) fn apply<B: OutputBus + ?Sized>(&mut self, data: &[u8], bus: &mut B) {
        let children = usize::from(self.channel_count() - u16::from(self.shared_dimmer));
        let shared = if self.shared_dimmer {
            data.get(children).copied()
        } else {
            None
        };
        let mut offset = 0;
        for slice in &mut self.slices {
            let end = offset + usize::from(slice.channel_count());
            let Some(channels) = data.get(offset..end) else {
                return;
            };
            slice.apply_with_dimmer(channels, shared, bus);
            offset = end;
        }
    }

    pub(crate) fn switch<B: OutputBus + ?Sized>(&self, on: bool, bus: &mut B) {
        for slice in &self.slices {
            slice.switch(on, bus);
        }
    }
}

/// Strictly increasing slice starts within the strip
fn slice_starts(config: &StripConfig, last_pixel: u16) -> Vec<u16, MAX_GROUP_SLICES> {
    if config.slices.is_empty() {
        let mut whole = Vec::new();
        let _ = whole.push(0);
        return whole;
    }
    let mut starts: Vec<u16, MAX_GROUP_SLICES> = Vec::new();
    for &first in &config.slices {
        if first > last_pixel {
            log::warn!("slice start {} is beyond strip {} end", first, config.strip);
            continue;
        }
        if starts.last().is_some_and(|&previous| first <= previous) {
            log::warn!(
                "slice start {} on strip {} overlaps the previous slice",
                first,
                config.strip
            );
            continue;
        }
        let _ = starts.push(first);
    }
    starts
}
