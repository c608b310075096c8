use embassy_time::Duration;

use super::{Animation, DEFAULT_FRAME_RATE_HZ, FrameEvents};
use crate::color::{Rgb, blend_colors};
use crate::device::PixelSlice;
use crate::math8::fraction8;
use crate::output::OutputBus;

/// Default duration of a full pass at channel value 255
pub const DEFAULT_MAX_DURATION_MS: u32 = 30_000;

/// Direction the head travels along the line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TailDirection {
    /// From the first pixel towards the last
    #[default]
    Right,
    /// From the last pixel towards the first
    Left,
}

/// Tail animation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TailConfig {
    pub direction: TailDirection,
    /// Pass duration at duration channel 255
    pub max_duration_ms: u32,
    pub tail_length: u8,
    pub repeat: bool,
    pub frame_rate_hz: u32,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            direction: TailDirection::Right,
            max_duration_ms: DEFAULT_MAX_DURATION_MS,
            tail_length: 0,
            repeat: false,
            frame_rate_hz: DEFAULT_FRAME_RATE_HZ,
        }
    }
}

/// Head moving along a pixel line, trailing a gradient
///
/// The head travels `len + tail_length` pixels per pass so the tail fully
/// leaves the line. Behind the head the color fades from `color1` to
/// `color2`; pixels the head skipped since the previous frame are filled
/// with `color2`.
#[derive(Debug, Clone)]
pub struct TailAnimation {
    animation: Animation,
    line: PixelSlice,
    direction: TailDirection,
    color1: Rgb,
    color2: Rgb,
    tail_length: u16,
    previous_head: i32,
    reached_end: bool,
}

impl TailAnimation {
    pub fn new(line: PixelSlice, direction: TailDirection, frame_rate_hz: u32) -> Self {
        let mut animation = Self {
            animation: Animation::new(frame_rate_hz, false),
            line,
            direction,
            color1: Rgb::default(),
            color2: Rgb::default(),
            tail_length: 0,
            previous_head: 0,
            reached_end: false,
        };
        animation.previous_head = animation.start_position();
        animation
    }

    pub const fn line(&self) -> &PixelSlice {
        &self.line
    }

    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn set_color1(&mut self, color: Rgb) {
        self.color1 = color;
    }

    pub fn set_color2(&mut self, color: Rgb) {
        self.color2 = color;
    }

    pub fn set_tail_length(&mut self, tail_length: u16) {
        self.tail_length = tail_length;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.animation.set_duration(duration);
    }

    pub fn set_repeat(&mut self, repeat: bool) {
        self.animation.set_repeat(repeat);
    }

    /// Start a pass from the beginning
    pub fn restart(&mut self) {
        self.animation.restart(0.0);
    }

    /// Render one frame
    pub fn frame<B: OutputBus + ?Sized>(&mut self, bus: &mut B) -> FrameEvents {
        let Some(step) = self.animation.step() else {
            return FrameEvents::default();
        };
        let mut events = step.events;
        if events.started {
            self.previous_head = self.start_position();
            self.reached_end = false;
        }
        events.head_reached_end = self.draw(step.progress, bus);
        events
    }

    /// Line length plus tail, the distance the head travels per pass
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn span(&self) -> i32 {
        self.line.len() as i32 + i32::from(self.tail_length)
    }

    const fn start_position_for(direction: TailDirection, span: i32) -> i32 {
        match direction {
            TailDirection::Right => 0,
            TailDirection::Left => span,
        }
    }

    fn start_position(&self) -> i32 {
        Self::start_position_for(self.direction, self.span())
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn draw<B: OutputBus + ?Sized>(&mut self, progress: f32, bus: &mut B) -> bool {
        let len = self.line.len() as i32;
        let tail = i32::from(self.tail_length);
        let span = self.span() as f32;
        let head = match self.direction {
            TailDirection::Right => (progress * span) as i32,
            TailDirection::Left => ((1.0 - progress) * span) as i32,
        };

        let at_end = match self.direction {
            TailDirection::Right => head >= len,
            TailDirection::Left => head <= 0,
        };
        let reached = at_end && !self.reached_end;
        if reached {
            self.reached_end = true;
        }

        let jump = (head - self.previous_head).abs();
        let effective = tail + jump;
        for i in 0..effective {
            let position = match self.direction {
                TailDirection::Right => head - i,
                TailDirection::Left => head + i,
            };
            if position < 0 || position >= len {
                continue;
            }
            let color = if i > tail {
                self.color2
            } else {
                blend_colors(
                    self.color1,
                    self.color2,
                    fraction8(i as f32 / effective as f32),
                )
            };
            self.line
                .set_pixel_color(position as usize, color.into(), bus);
        }

        self.previous_head = head;
        reached
    }
}

/// DMX-controlled [`TailAnimation`]
///
/// | channel | meaning                                   |
/// |---------|-------------------------------------------|
/// | 0..3    | head color                                |
/// | 3..6    | tail end color                            |
/// | 6       | pass duration, 0 stops after this pass    |
/// | 7       | tail length in pixels                     |
#[derive(Debug, Clone)]
pub struct TailAnimationDevice {
    animation: TailAnimation,
    max_duration: Duration,
    last: Option<[u8; 8]>,
}

impl TailAnimationDevice {
    pub const CHANNELS: u16 = 8;

    pub fn new(line: PixelSlice, config: &TailConfig) -> Self {
        let mut animation = TailAnimation::new(line, config.direction, config.frame_rate_hz);
        animation.set_tail_length(u16::from(config.tail_length));
        animation.set_repeat(config.repeat);
        Self {
            animation,
            max_duration: Duration::from_millis(u64::from(config.max_duration_ms)),
            last: None,
        }
    }

    pub const fn animation(&self) -> &TailAnimation {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut TailAnimation {
        &mut self.animation
    }

    pub(crate) fn apply(&mut self, data: &[u8]) {
        let Some(data) = data.get(..8).and_then(|d| <[u8; 8]>::try_from(d).ok()) else {
            return;
        };
        if self.last == Some(data) {
            return;
        }
        self.last = Some(data);

        self.animation.set_color1(Rgb::new(data[0], data[1], data[2]));
        self.animation.set_color2(Rgb::new(data[3], data[4], data[5]));
        let duration = data[6];
        if duration > 0 {
            // Rebases a running pass onto the new speed
            self.animation
                .set_duration(self.max_duration * u32::from(duration) / 255);
        }
        self.animation.set_repeat(duration > 0);
        self.animation.set_tail_length(u16::from(data[7]));
    }

    pub(crate) fn animate<B: OutputBus + ?Sized>(&mut self, bus: &mut B) -> FrameEvents {
        self.animation.frame(bus)
    }
}
