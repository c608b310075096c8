//! Channel devices with compile-time known variants
//!
//! All devices are stored in an enum to avoid heap allocations. Each variant
//! consumes a fixed run of DMX channels and translates it into output state.

mod dimmer;
mod group;
mod servo;
mod slice;

pub use dimmer::Dimmer;
pub use group::{DeviceGroup, MAX_GROUP_SLICES, StripConfig};
pub use servo::{DEFAULT_MAX_ANGLE, Servo, ServoConfig};
pub use slice::{PixelSlice, SliceLayout};

use crate::animation::{FrameEvents, PwmFadeDevice, TailAnimationDevice, WaveDevice};
use crate::output::OutputBus;

/// Maximum length of a device name
pub const DEVICE_NAME_LEN: usize = 24;

/// Name used to bind external controls to a device
pub type DeviceName = heapless::String<DEVICE_NAME_LEN>;

const DIMMER_MODE_NAME_NONE: &str = "none";
const DIMMER_MODE_NAME_SINGLE: &str = "single";
const DIMMER_MODE_NAME_PER_SLICE: &str = "per-slice";

/// How a trailing dimmer channel is laid out for a strip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DimmerMode {
    /// No dimmer channel
    #[default]
    None,
    /// One dimmer channel after all slices, shared by the whole strip
    Single,
    /// Every slice carries its own dimmer channel
    PerSlice,
}

impl DimmerMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => DIMMER_MODE_NAME_NONE,
            Self::Single => DIMMER_MODE_NAME_SINGLE,
            Self::PerSlice => DIMMER_MODE_NAME_PER_SLICE,
        }
    }

    /// Parse the persisted name; unknown names fall back to [`DimmerMode::None`]
    pub fn parse_from_str(s: &str) -> Self {
        match s {
            DIMMER_MODE_NAME_SINGLE => Self::Single,
            DIMMER_MODE_NAME_PER_SLICE => Self::PerSlice,
            _ => Self::None,
        }
    }
}

/// Device slot - enum containing all possible channel devices
#[derive(Debug, Clone)]
pub enum ChannelDevice {
    /// Single PWM channel with gamma-corrected brightness
    SingleChannel(Dimmer),
    /// RGB or RGBW pixel range on a strip
    Slice(PixelSlice),
    /// Hobby servo
    Servo(Servo),
    /// All slices of one strip, optionally with a shared dimmer
    Group(DeviceGroup),
    /// Moving head with a gradient tail along a pixel line
    Tail(TailAnimationDevice),
    /// PWM channel fading between two values
    PwmFade(PwmFadeDevice),
    /// Round-robin color fades over several pixel lines
    Wave(WaveDevice),
}

impl ChannelDevice {
    /// Number of DMX channels consumed by this device
    pub fn channel_count(&self) -> u16 {
        match self {
            Self::SingleChannel(_) => Dimmer::CHANNELS,
            Self::Slice(slice) => slice.channel_count(),
            Self::Servo(_) => Servo::CHANNELS,
            Self::Group(group) => group.channel_count(),
            Self::Tail(_) => TailAnimationDevice::CHANNELS,
            Self::PwmFade(_) => PwmFadeDevice::CHANNELS,
            Self::Wave(wave) => wave.channel_count(),
        }
    }

    /// Apply this device's slice of the DMX frame
    ///
    /// `data` holds exactly [`ChannelDevice::channel_count`] bytes.
    pub fn apply<B: OutputBus + ?Sized>(&mut self, data: &[u8], bus: &mut B) {
        match self {
            Self::SingleChannel(device) => device.apply(data, bus),
            Self::Slice(device) => device.apply(data, bus),
            Self::Servo(device) => device.apply(data, bus),
            Self::Group(device) => device.apply(data, bus),
            Self::Tail(device) => device.apply(data),
            Self::PwmFade(device) => device.apply(data, bus),
            Self::Wave(device) => device.apply(data),
        }
    }

    /// Advance the device's animation by one frame
    ///
    /// Plain devices have nothing to animate and return no events.
    pub fn animate<B: OutputBus + ?Sized>(&mut self, bus: &mut B) -> FrameEvents {
        match self {
            Self::Tail(device) => device.animate(bus),
            Self::PwmFade(device) => device.animate(bus),
            Self::Wave(device) => device.animate(bus),
            Self::SingleChannel(_) | Self::Slice(_) | Self::Servo(_) | Self::Group(_) => {
                FrameEvents::default()
            }
        }
    }

    /// Check if the device is driven by an animation
    pub const fn is_animated(&self) -> bool {
        matches!(self, Self::Tail(_) | Self::PwmFade(_) | Self::Wave(_))
    }

    /// Switch the device fully on or off
    ///
    /// Returns `false` for devices that cannot be switched.
    pub fn switch<B: OutputBus + ?Sized>(&mut self, on: bool, bus: &mut B) -> bool {
        match self {
            Self::SingleChannel(device) => device.switch(on, bus),
            Self::Slice(device) => device.switch(on, bus),
            Self::Group(device) => device.switch(on, bus),
            Self::Servo(_) | Self::Tail(_) | Self::PwmFade(_) | Self::Wave(_) => return false,
        }
        true
    }
}

impl From<Dimmer> for ChannelDevice {
    fn from(device: Dimmer) -> Self {
        Self::SingleChannel(device)
    }
}

impl From<PixelSlice> for ChannelDevice {
    fn from(device: PixelSlice) -> Self {
        Self::Slice(device)
    }
}

impl From<Servo> for ChannelDevice {
    fn from(device: Servo) -> Self {
        Self::Servo(device)
    }
}

impl From<DeviceGroup> for ChannelDevice {
    fn from(device: DeviceGroup) -> Self {
        Self::Group(device)
    }
}

impl From<TailAnimationDevice> for ChannelDevice {
    fn from(device: TailAnimationDevice) -> Self {
        Self::Tail(device)
    }
}

impl From<PwmFadeDevice> for ChannelDevice {
    fn from(device: PwmFadeDevice) -> Self {
        Self::PwmFade(device)
    }
}

impl From<WaveDevice> for ChannelDevice {
    fn from(device: WaveDevice) -> Self {
        Self::Wave(device)
    }
}
