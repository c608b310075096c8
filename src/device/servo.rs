use crate::math8::map8;
use crate::output::{OutputBus, OutputPin};

/// Default servo travel in degrees
pub const DEFAULT_MAX_ANGLE: u16 = 180;

/// Servo wiring and travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServoConfig {
    pub pin: OutputPin,
    #[cfg_attr(feature = "serde", serde(default = "default_max_angle"))]
    pub max_angle: u16,
}

#[cfg(feature = "serde")]
const fn default_max_angle() -> u16 {
    DEFAULT_MAX_ANGLE
}

impl ServoConfig {
    pub const fn new(pin: OutputPin) -> Self {
        Self {
            pin,
            max_angle: DEFAULT_MAX_ANGLE,
        }
    }
}

/// Hobby servo positioned by one DMX byte
///
/// 0 maps to 0 degrees and 255 to the configured maximum angle.
#[derive(Debug, Clone)]
pub struct Servo {
    config: ServoConfig,
    value: Option<u8>,
}

impl Servo {
    pub const CHANNELS: u16 = 1;

    pub const fn new(config: ServoConfig) -> Self {
        Self {
            config,
            value: None,
        }
    }

    /// Last written angle in degrees, `None` before the first frame
    #[allow(clippy::cast_possible_truncation)]
    pub fn angle(&self) -> Option<u16> {
        self.value
            .map(|value| map8(value, u32::from(self.config.max_angle)) as u16)
    }

    pub(crate) fn apply<B: OutputBus + ?Sized>(&mut self, data: &[u8], bus: &mut B) {
        let Some(&value) = data.first() else {
            return;
        };
        if self.value == Some(value) {
            return;
        }
        self.value = Some(value);
        if let Some(angle) = self.angle() {
            bus.set_angle(self.config.pin, angle);
        }
    }
}
