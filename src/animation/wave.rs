use embassy_time::Duration;
use heapless::Vec;

use super::{Animation, DEFAULT_FRAME_RATE_HZ, FrameEvents};
use crate::color::{Rgb, blend_colors};
use crate::device::PixelSlice;
use crate::math8::fraction8;
use crate::output::OutputBus;

/// Maximum number of lines in one wave
pub const MAX_WAVE_LINES: usize = 16;

/// Default fade time at fade channel 255
pub const DEFAULT_MAX_FADE_TIME_MS: u32 = 10_000;

const MIN_FADE_TIME: Duration = Duration::from_millis(100);
const INITIAL_FADE_TIME: Duration = Duration::from_millis(1000);

/// Wave settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WaveConfig {
    /// Fade time per line at fade channel 255
    pub max_fade_time_ms: u32,
    pub frame_rate_hz: u32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            max_fade_time_ms: DEFAULT_MAX_FADE_TIME_MS,
            frame_rate_hz: DEFAULT_FRAME_RATE_HZ,
        }
    }
}

/// Color fade of a single wave line
///
/// Each cycle fades from the color shown last to either `color1` or
/// `color2`, picked when the cycle starts.
#[derive(Debug, Clone)]
pub struct FadeAnimation {
    animation: Animation,
    color1: Rgb,
    color2: Rgb,
    dimmer: u8,
    current: Rgb,
    target: Rgb,
    first_color: bool,
}

impl FadeAnimation {
    pub fn new(frame_rate_hz: u32) -> Self {
        Self {
            animation: Animation::with_duration(frame_rate_hz, INITIAL_FADE_TIME, false),
            color1: Rgb::default(),
            color2: Rgb::default(),
            dimmer: u8::MAX,
            current: Rgb::default(),
            target: Rgb::default(),
            first_color: true,
        }
    }

    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn set_colors(&mut self, color1: Rgb, color2: Rgb) {
        self.color1 = color1;
        self.color2 = color2;
    }

    pub fn set_dimmer(&mut self, dimmer: u8) {
        self.dimmer = dimmer;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.animation.set_duration(duration);
    }

    /// Pick `color1` (or `color2` when `false`) as the next target
    pub fn set_first_color(&mut self, first_color: bool) {
        self.first_color = first_color;
    }

    /// Color the line is fading towards
    pub const fn target(&self) -> Rgb {
        self.target
    }

    pub fn restart(&mut self) {
        self.animation.restart(0.0);
    }

    /// Render one frame onto `line`
    pub fn frame<B: OutputBus + ?Sized>(&mut self, line: &PixelSlice, bus: &mut B) -> FrameEvents {
        let Some(step) = self.animation.step() else {
            return FrameEvents::default();
        };
        if step.events.started {
            self.current = self.target;
            self.target = if self.first_color {
                self.color1
            } else {
                self.color2
            };
        }
        let color = blend_colors(self.current, self.target, fraction8(step.progress));
        line.set_color(color.into(), self.dimmer, bus);
        step.events
    }
}

#[derive(Debug, Clone)]
struct WaveLine {
    line: PixelSlice,
    fade: FadeAnimation,
}

/// Color fades that run over a set of lines one after another
///
/// The active line fades to the current color; when it finishes the next
/// line starts. After the last line the wave switches between `color1` and
/// `color2` and begins again with the first line.
///
/// | channel | meaning                                   |
/// |---------|-------------------------------------------|
/// | 0..3    | first color                               |
/// | 3..6    | second color                              |
/// | 6       | fade time per line                        |
/// | 7       | dimmer, only if any line is dimmable      |
#[derive(Debug, Clone)]
pub struct WaveDevice {
    lines: Vec<WaveLine, MAX_WAVE_LINES>,
    current: usize,
    first_color: bool,
    dimmable: bool,
    max_fade_time: Duration,
}

impl WaveDevice {
    /// Build a wave over `lines`; lines beyond [`MAX_WAVE_LINES`] are dropped
    pub fn new(lines: impl IntoIterator<Item = PixelSlice>, config: &WaveConfig) -> Self {
        let mut wave = Self {
            lines: Vec::new(),
            current: 0,
            first_color: true,
            dimmable: false,
            max_fade_time: Duration::from_millis(u64::from(config.max_fade_time_ms)),
        };
        for line in lines {
            wave.dimmable |= line.is_dimmable();
            let fade = FadeAnimation::new(config.frame_rate_hz);
            if wave.lines.push(WaveLine { line, fade }).is_err() {
                log::warn!("wave supports at most {} lines", MAX_WAVE_LINES);
                break;
            }
        }
        if let Some(first) = wave.lines.first_mut() {
            first.fade.restart();
        }
        wave
    }

    pub fn channel_count(&self) -> u16 {
        if self.dimmable { 8 } else { 7 }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the line currently fading
    pub const fn current_line(&self) -> usize {
        self.current
    }

    /// Check if the wave is heading to the first color
    pub const fn is_first_color(&self) -> bool {
        self.first_color
    }

    pub fn fade(&self, line: usize) -> Option<&FadeAnimation> {
        self.lines.get(line).map(|l| &l.fade)
    }

    pub(crate) fn apply(&mut self, data: &[u8]) {
        let [r1, g1, b1, r2, g2, b2, fade, rest @ ..] = data else {
            return;
        };
        let color1 = Rgb::new(*r1, *g1, *b1);
        let color2 = Rgb::new(*r2, *g2, *b2);
        let dimmer = if self.dimmable {
            rest.first().copied().unwrap_or(u8::MAX)
        } else {
            u8::MAX
        };
        let duration = (self.max_fade_time * u32::from(*fade) / 255).max(MIN_FADE_TIME);
        for line in &mut self.lines {
            line.fade.set_colors(color1, color2);
            line.fade.set_dimmer(dimmer);
            line.fade.set_duration(duration);
        }
    }

    pub(crate) fn animate<B: OutputBus + ?Sized>(&mut self, bus: &mut B) -> FrameEvents {
        let Some(active) = self.lines.get_mut(self.current) else {
            return FrameEvents::default();
        };
        let step = active.fade.frame(&active.line, bus);
        let mut events = FrameEvents {
            started: step.started && self.current == 0,
            ..FrameEvents::default()
        };
        if step.ended {
            events.ended = self.advance();
        }
        events
    }

    /// Move to the next line, returns `true` when a full pass completed
    fn advance(&mut self) -> bool {
        self.current += 1;
        let wrapped = self.current >= self.lines.len();
        if wrapped {
            self.current = 0;
            self.first_color = !self.first_color;
            for line in &mut self.lines {
                line.fade.set_first_color(self.first_color);
            }
        }
        if let Some(next) = self.lines.get_mut(self.current) {
            next.fade.restart();
        }
        wrapped
    }
}
