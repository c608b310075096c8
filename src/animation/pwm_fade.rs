use embassy_time::Duration;

use super::{Animation, DEFAULT_FRAME_RATE_HZ, FrameEvents};
use crate::device::Dimmer;
use crate::math8::lerp8;
use crate::output::OutputBus;

/// Time unit of the fade duration channels
pub const FADE_STEP: Duration = Duration::from_millis(100);

/// Dimmer fading between two levels
///
/// Fading in goes from `value1` to `value2`, fading out goes back. Reversing
/// direction mid-fade continues from the current level instead of jumping.
#[derive(Debug, Clone)]
pub struct PwmFadeAnimation {
    animation: Animation,
    dimmer: Dimmer,
    value1: u8,
    value2: u8,
    fading_in: bool,
}

impl PwmFadeAnimation {
    pub const fn new(dimmer: Dimmer, frame_rate_hz: u32) -> Self {
        Self {
            animation: Animation::new(frame_rate_hz, false),
            dimmer,
            value1: 0,
            value2: 0,
            fading_in: false,
        }
    }

    pub const fn dimmer(&self) -> &Dimmer {
        &self.dimmer
    }

    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Check if the last requested direction was a fade in
    pub const fn is_fading_in(&self) -> bool {
        self.fading_in
    }

    /// Set the resting level; shown right away while faded out and idle
    pub fn set_value1<B: OutputBus + ?Sized>(&mut self, value: u8, bus: &mut B) {
        self.value1 = value;
        if !self.fading_in && !self.animation.is_running() {
            self.dimmer.set_value(value, bus);
        }
    }

    /// Set the active level; shown right away while faded in and idle
    pub fn set_value2<B: OutputBus + ?Sized>(&mut self, value: u8, bus: &mut B) {
        self.value2 = value;
        if self.fading_in && !self.animation.is_running() {
            self.dimmer.set_value(value, bus);
        }
    }

    /// Fade from `value1` to `value2`
    pub fn fade_in(&mut self, duration: Duration) {
        self.start(true, duration);
    }

    /// Fade from `value2` to `value1`
    pub fn fade_out(&mut self, duration: Duration) {
        self.start(false, duration);
    }

    /// Reverse the last requested direction
    pub fn toggle(&mut self, fade_in: Duration, fade_out: Duration) {
        if self.fading_in {
            self.fade_out(fade_out);
        } else {
            self.fade_in(fade_in);
        }
    }

    fn start(&mut self, fade_in: bool, duration: Duration) {
        if !self.animation.is_running() {
            self.fading_in = fade_in;
            self.animation.set_duration(duration);
            self.animation.restart(0.0);
        } else if self.fading_in != fade_in {
            // Resume at the mirrored position so the level stays continuous
            let progress = self.animation.progress();
            self.fading_in = fade_in;
            self.animation.set_duration(duration);
            self.animation.restart(1.0 - progress);
        }
    }

    fn level(&self, progress: f32) -> u8 {
        if self.fading_in {
            lerp8(self.value1, self.value2, progress)
        } else {
            lerp8(self.value2, self.value1, progress)
        }
    }

    /// Render one frame
    pub fn frame<B: OutputBus + ?Sized>(&mut self, bus: &mut B) -> FrameEvents {
        let Some(step) = self.animation.step() else {
            return FrameEvents::default();
        };
        let level = self.level(step.progress);
        self.dimmer.set_value(level, bus);
        step.events
    }
}

/// DMX-controlled [`PwmFadeAnimation`]
///
/// | channel | meaning                                    |
/// |---------|--------------------------------------------|
/// | 0       | resting level                              |
/// | 1       | active level                               |
/// | 2       | fade in time, 100 ms steps                 |
/// | 3       | fade out time, 100 ms steps                |
/// | 4       | on/off trigger, nonzero fades in           |
#[derive(Debug, Clone)]
pub struct PwmFadeDevice {
    fade: PwmFadeAnimation,
    last: [u8; 5],
}

impl PwmFadeDevice {
    pub const CHANNELS: u16 = 5;
    /// Channel whose changes start a fade
    pub const TRIGGER_CHANNEL: u16 = 4;

    pub const fn new(dimmer: Dimmer) -> Self {
        Self::with_frame_rate(dimmer, DEFAULT_FRAME_RATE_HZ)
    }

    pub const fn with_frame_rate(dimmer: Dimmer, frame_rate_hz: u32) -> Self {
        Self {
            fade: PwmFadeAnimation::new(dimmer, frame_rate_hz),
            last: [0; 5],
        }
    }

    pub const fn fade(&self) -> &PwmFadeAnimation {
        &self.fade
    }

    pub(crate) fn apply<B: OutputBus + ?Sized>(&mut self, data: &[u8], bus: &mut B) {
        let Some(data) = data.get(..5).and_then(|d| <[u8; 5]>::try_from(d).ok()) else {
            return;
        };
        if data == self.last {
            return;
        }
        let trigger = usize::from(Self::TRIGGER_CHANNEL);
        let toggled = data[trigger] != self.last[trigger];
        self.last = data;

        self.fade.set_value1(data[0], bus);
        self.fade.set_value2(data[1], bus);
        if toggled {
            if data[trigger] > 0 {
                self.fade.fade_in(FADE_STEP * u32::from(data[2]));
            } else {
                self.fade.fade_out(FADE_STEP * u32::from(data[3]));
            }
        }
    }

    pub(crate) fn animate<B: OutputBus + ?Sized>(&mut self, bus: &mut B) -> FrameEvents {
        self.fade.frame(bus)
    }
}
