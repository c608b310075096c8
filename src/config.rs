//! Controller-wide settings.
//!
//! Device-specific settings live next to their devices
//! ([`crate::device::StripConfig`], [`crate::device::ServoConfig`],
//! [`crate::animation::TailConfig`], [`crate::animation::WaveConfig`]).
//! Durations are plain integers so the structs serialize without adapters.

use embassy_time::Duration;

pub use crate::animation::EngineConfig;

/// Default interval between hardware commits (50 Hz)
pub const DEFAULT_COMMIT_INTERVAL_MS: u32 = 20;

/// Where the controller listens on the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DmxConfig {
    /// Art-Net universe to accept
    pub universe: u16,
    /// 1-based channel of the first device
    pub first_channel: u16,
}

impl Default for DmxConfig {
    fn default() -> Self {
        Self {
            universe: 0,
            first_channel: 1,
        }
    }
}

/// Commit pacing and idle detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControlLoopConfig {
    pub commit_interval_ms: u32,
    /// Minutes without network frames before the controller reports idle,
    /// 0 disables idle detection
    pub max_idle_min: u16,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        Self {
            commit_interval_ms: DEFAULT_COMMIT_INTERVAL_MS,
            max_idle_min: 0,
        }
    }
}

impl ControlLoopConfig {
    pub fn commit_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.commit_interval_ms))
    }

    pub fn max_idle(&self) -> Option<Duration> {
        (self.max_idle_min > 0).then(|| Duration::from_secs(u64::from(self.max_idle_min) * 60))
    }
}

/// All controller settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    pub dmx: DmxConfig,
    pub engine: EngineConfig,
    pub control: ControlLoopConfig,
}
