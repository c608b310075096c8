//! External controls bound to device channels.
//!
//! A binding resolves a named device and a channel within it to an absolute
//! slot of the [`FrameBuffer`]. Local inputs such as a wall switch write that
//! slot directly, as if the value had arrived from the network.

use crate::ingest::{DMX_UNIVERSE_SIZE, FrameBuffer};
use crate::registry::DeviceRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingError {
    /// No device with that name
    NotFound,
    /// The channel is outside the device or the universe
    ChannelOutOfRange,
}

impl core::fmt::Display for BindingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => f.write_str("device not found"),
            Self::ChannelOutOfRange => f.write_str("channel out of range"),
        }
    }
}

/// A resolved frame slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBinding {
    index: usize,
}

impl ControlBinding {
    /// Bind to `channel` (0-based) of the device registered as `name`
    ///
    /// Failures are logged; the caller is expected to skip the binding.
    pub fn resolve<const N: usize>(
        registry: &DeviceRegistry<N>,
        name: &str,
        channel: u16,
    ) -> Result<Self, BindingError> {
        Self::lookup(registry, name, channel).inspect_err(|err| {
            log::warn!("cannot bind {} channel {}: {}", name, channel, err);
        })
    }

    fn lookup<const N: usize>(
        registry: &DeviceRegistry<N>,
        name: &str,
        channel: u16,
    ) -> Result<Self, BindingError> {
        let (offset, device) = registry.find(name).ok_or(BindingError::NotFound)?;
        if channel >= device.channel_count() {
            return Err(BindingError::ChannelOutOfRange);
        }
        let index = usize::from(registry.first_channel().saturating_sub(1))
            + usize::from(offset)
            + usize::from(channel);
        if index >= DMX_UNIVERSE_SIZE {
            return Err(BindingError::ChannelOutOfRange);
        }
        Ok(Self { index })
    }

    /// 0-based index into the frame
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Inject a value into the frame
    pub fn write(&self, frames: &FrameBuffer, value: u8) {
        frames.set(self.index, value);
    }

    pub fn read(&self, frames: &FrameBuffer) -> u8 {
        frames.get(self.index).unwrap_or(0)
    }
}
