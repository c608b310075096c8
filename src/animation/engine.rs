//! Fixed-rate animation ticking.
//!
//! Portable frame pacing without async/await or platform-specific timers.
//! The caller polls with the current time and sleeps until the returned
//! deadline.

use embassy_time::{Duration, Instant};

use super::{AnimationEvent, DEFAULT_FRAME_RATE_HZ};
use crate::output::OutputBus;
use crate::registry::{DeviceId, DeviceRegistry};

/// Animation timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub frame_rate_hz: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: DEFAULT_FRAME_RATE_HZ,
        }
    }
}

impl EngineConfig {
    /// Duration of one frame, never shorter than a millisecond
    pub fn frame_duration(&self) -> Duration {
        let millis = 1000 / u64::from(self.frame_rate_hz.max(1));
        Duration::from_millis(millis.max(1))
    }
}

/// Receives animation events, tagged with the device that raised them
pub trait AnimationObserver {
    fn on_event(&mut self, device: DeviceId, event: AnimationEvent);
}

impl AnimationObserver for () {
    fn on_event(&mut self, _device: DeviceId, _event: AnimationEvent) {}
}

/// Result of a frame tick
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// The deadline for the next frame.
    pub next_deadline: Instant,
    /// How long to wait until the next frame (may be zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Ticks every animated device at a fixed frame rate
///
/// Keeps a frame deadline with drift correction: after a stall longer than
/// two frames the schedule restarts from now instead of replaying the
/// backlog.
#[derive(Debug, Clone)]
pub struct AnimationEngine {
    frame_duration: Duration,
    next_frame: Option<Instant>,
}

impl AnimationEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            frame_duration: config.frame_duration(),
            next_frame: None,
        }
    }

    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Deadline of the next frame, `None` before the first one
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.next_frame
    }

    /// Check if a frame is due at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_frame.is_none_or(|deadline| now >= deadline)
    }

    /// Run one animation frame on every device if one is due
    ///
    /// Returns `None` when called before the next deadline.
    pub fn poll<B, O, const N: usize>(
        &mut self,
        now: Instant,
        registry: &mut DeviceRegistry<N>,
        bus: &mut B,
        observer: &mut O,
    ) -> Option<FrameResult>
    where
        B: OutputBus + ?Sized,
        O: AnimationObserver + ?Sized,
    {
        if !self.is_due(now) {
            return None;
        }
        Some(self.tick(now, registry, bus, observer))
    }

    /// Run one animation frame unconditionally
    pub fn tick<B, O, const N: usize>(
        &mut self,
        now: Instant,
        registry: &mut DeviceRegistry<N>,
        bus: &mut B,
        observer: &mut O,
    ) -> FrameResult
    where
        B: OutputBus + ?Sized,
        O: AnimationObserver + ?Sized,
    {
        let max_drift = self.frame_duration * 2;
        let mut deadline = self.next_frame.unwrap_or(now);
        if now > deadline + max_drift {
            deadline = now;
        }

        registry.animate(bus, observer);

        deadline += self.frame_duration;
        self.next_frame = Some(deadline);

        FrameResult {
            next_deadline: deadline,
            sleep_duration: deadline.saturating_duration_since(now),
        }
    }
}
