use crate::gamma::{DIMMER_MAX_DUTY, dimmer_gamma};
use crate::output::{OutputBus, OutputPin};

/// Single PWM channel driven by one DMX byte
///
/// The byte is passed through [`dimmer_gamma`] before it reaches the pin.
/// The duty is staged only when it changes.
#[derive(Debug, Clone)]
pub struct Dimmer {
    pin: OutputPin,
    duty: u16,
}

impl Dimmer {
    pub const CHANNELS: u16 = 1;

    /// Create a dimmer on a PWM pin, initially dark
    pub const fn new(pin: OutputPin) -> Self {
        Self { pin, duty: 0 }
    }

    pub const fn pin(&self) -> OutputPin {
        self.pin
    }

    /// Last staged duty
    pub const fn duty(&self) -> u16 {
        self.duty
    }

    pub(crate) fn apply<B: OutputBus + ?Sized>(&mut self, data: &[u8], bus: &mut B) {
        if let Some(&value) = data.first() {
            self.set_value(value, bus);
        }
    }

    /// Set brightness from a raw 0-255 channel value
    pub fn set_value<B: OutputBus + ?Sized>(&mut self, value: u8, bus: &mut B) {
        self.set_duty(dimmer_gamma(value), bus);
    }

    pub(crate) fn switch<B: OutputBus + ?Sized>(&mut self, on: bool, bus: &mut B) {
        self.set_duty(if on { DIMMER_MAX_DUTY } else { 0 }, bus);
    }

    fn set_duty<B: OutputBus + ?Sized>(&mut self, duty: u16, bus: &mut B) {
        if duty == self.duty {
            return;
        }
        self.duty = duty;
        bus.set_duty(self.pin, duty);
    }
}
