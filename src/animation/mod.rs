//! Frame-counted animations.
//!
//! An [`Animation`] converts a duration into a number of frames at a fixed
//! frame rate and reports progress in `[0, 1]`. Every call to
//! [`Animation::step`] consumes one frame. Devices built on top of it live in
//! the submodules.

mod engine;
mod pwm_fade;
mod tail;
mod wave;

pub use engine::{AnimationEngine, AnimationObserver, EngineConfig, FrameResult};
pub use pwm_fade::{PwmFadeAnimation, PwmFadeDevice};
pub use tail::{TailAnimation, TailAnimationDevice, TailConfig, TailDirection};
pub use wave::{FadeAnimation, MAX_WAVE_LINES, WaveConfig, WaveDevice};

use embassy_time::Duration;

/// Frame rate used when none is configured
pub const DEFAULT_FRAME_RATE_HZ: u32 = 50;

/// Notification raised by an animation while it runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// First frame of a cycle
    Started,
    /// Last frame of a cycle
    Ended,
    /// Tail head left the far end of its line
    HeadReachedEnd,
}

/// Events raised during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameEvents {
    pub started: bool,
    pub ended: bool,
    pub head_reached_end: bool,
}

impl FrameEvents {
    pub const fn is_empty(&self) -> bool {
        !(self.started || self.ended || self.head_reached_end)
    }

    /// Combine events of several animations
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            started: self.started || other.started,
            ended: self.ended || other.ended,
            head_reached_end: self.head_reached_end || other.head_reached_end,
        }
    }

    /// Iterate raised events in the order they happen within a frame
    pub fn iter(&self) -> impl Iterator<Item = AnimationEvent> {
        [
            (self.started, AnimationEvent::Started),
            (self.head_reached_end, AnimationEvent::HeadReachedEnd),
            (self.ended, AnimationEvent::Ended),
        ]
        .into_iter()
        .filter_map(|(raised, event)| raised.then_some(event))
    }
}

/// Animation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    /// Never started
    Idle,
    /// Frames remain in the current cycle
    Running,
    /// The last cycle ran out and did not repeat
    Completed,
}

/// Progress of one frame, returned by [`Animation::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStep {
    /// Progress to render this frame at, `0.0` on the first frame of a cycle
    /// and `1.0` on the last one
    pub progress: f32,
    pub events: FrameEvents,
}

/// Frame counter behind every animation
#[derive(Debug, Clone)]
pub struct Animation {
    frame_rate_hz: u32,
    duration: Duration,
    total_frames: u32,
    remaining_frames: u32,
    repeat: bool,
    completed: bool,
}

impl Animation {
    /// Create an idle animation with zero duration
    pub const fn new(frame_rate_hz: u32, repeat: bool) -> Self {
        Self {
            frame_rate_hz,
            duration: Duration::from_ticks(0),
            total_frames: 1,
            remaining_frames: 0,
            repeat,
            completed: false,
        }
    }

    /// Create an idle animation with a duration
    pub fn with_duration(frame_rate_hz: u32, duration: Duration, repeat: bool) -> Self {
        let mut animation = Self::new(frame_rate_hz, repeat);
        animation.duration = duration;
        animation
    }

    /// Set the cycle duration
    ///
    /// A running cycle is rebased onto the new frame count at its current
    /// progress. An idle animation picks the duration up on the next
    /// [`Animation::restart`], unless it repeats, in which case it starts
    /// once the duration is nonzero.
    pub fn set_duration(&mut self, duration: Duration) {
        if duration == self.duration {
            return;
        }
        self.duration = duration;
        if self.is_running() {
            self.rebase();
        } else if self.repeat && self.has_duration() {
            self.restart(0.0);
        }
    }

    /// Restart the running cycle at its current progress
    fn rebase(&mut self) {
        let progress = if self.total_frames > 1 {
            self.progress()
        } else {
            0.0
        };
        self.restart(progress);
        // The cycle still has to raise its end
        self.remaining_frames = self.remaining_frames.max(1);
    }

    const fn has_duration(&self) -> bool {
        self.duration.as_ticks() > 0
    }

    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Enable or disable looping
    ///
    /// Enabling it on a finished animation with a nonzero duration starts a
    /// new cycle right away.
    pub fn set_repeat(&mut self, repeat: bool) {
        if repeat && self.remaining_frames == 0 && self.has_duration() {
            self.restart(0.0);
        }
        self.repeat = repeat;
    }

    pub const fn is_repeating(&self) -> bool {
        self.repeat
    }

    /// Start a new cycle at `initial_progress` in `[0, 1]`
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn restart(&mut self, initial_progress: f32) {
        self.total_frames = self.frames_for(self.duration);
        let left = 1.0 - initial_progress.clamp(0.0, 1.0);
        let remaining = libm::floorf(self.total_frames as f32 * left) as u32;
        self.remaining_frames = remaining.min(self.total_frames);
        self.completed = false;
        log::trace!(
            "animation restarted: {} of {} frames",
            self.remaining_frames,
            self.total_frames
        );
    }

    /// Number of frames a duration spans, at least one
    fn frames_for(&self, duration: Duration) -> u32 {
        let frames = duration.as_millis() * u64::from(self.frame_rate_hz) / 1000;
        u32::try_from(frames).unwrap_or(u32::MAX).max(1)
    }

    /// Frames in the current cycle
    pub const fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Frames left in the current cycle
    pub const fn remaining_frames(&self) -> u32 {
        self.remaining_frames
    }

    /// Progress of the next frame in `[0, 1]`
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f32 {
        if self.total_frames <= 1 {
            return 1.0;
        }
        let done = self.total_frames.saturating_sub(self.remaining_frames);
        (done as f32 / (self.total_frames - 1) as f32).clamp(0.0, 1.0)
    }

    pub const fn is_running(&self) -> bool {
        self.remaining_frames > 0
    }

    pub const fn state(&self) -> AnimationState {
        if self.remaining_frames > 0 {
            AnimationState::Running
        } else if self.completed {
            AnimationState::Completed
        } else {
            AnimationState::Idle
        }
    }

    /// Consume one frame
    ///
    /// Returns `None` when not running. When the last frame is consumed the
    /// step reports `ended`, and a repeating animation immediately starts its
    /// next cycle.
    pub fn step(&mut self) -> Option<FrameStep> {
        if self.remaining_frames == 0 {
            return None;
        }
        let mut events = FrameEvents {
            started: self.remaining_frames == self.total_frames,
            ..FrameEvents::default()
        };
        let progress = self.progress();
        self.remaining_frames -= 1;
        if self.remaining_frames == 0 {
            events.ended = true;
            self.completed = true;
            if self.repeat && self.has_duration() {
                self.restart(0.0);
            }
        }
        Some(FrameStep { progress, events })
    }
}
