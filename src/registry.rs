//! Ordered set of channel devices covering the DMX universe.
//!
//! Devices are laid out back to back starting at the configured first
//! channel. Registration order is channel order.

use heapless::Vec;

use crate::animation::AnimationObserver;
use crate::device::{ChannelDevice, DEVICE_NAME_LEN, DeviceName};
use crate::output::OutputBus;

/// Stable handle of a registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u16);

impl DeviceId {
    pub const fn raw(self) -> u16 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Entry {
    id: DeviceId,
    name: Option<DeviceName>,
    device: ChannelDevice,
}

/// Outcome of [`DeviceRegistry::apply`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Devices that received their channels
    pub applied: usize,
    /// Channels consumed, counted from the first channel
    pub channels: usize,
    /// The frame ended before all devices were served
    pub truncated: bool,
}

/// Devices in channel order, holding at most `N`
#[derive(Debug)]
pub struct DeviceRegistry<const N: usize> {
    first_channel: u16,
    entries: Vec<Entry, N>,
    next_id: u16,
}

impl<const N: usize> DeviceRegistry<N> {
    /// Create an empty registry whose first device starts at the 1-based
    /// `first_channel`
    pub const fn new(first_channel: u16) -> Self {
        Self {
            first_channel,
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub const fn first_channel(&self) -> u16 {
        self.first_channel
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a device after all registered ones
    ///
    /// Hands the device back if the registry is full.
    pub fn add(&mut self, device: impl Into<ChannelDevice>) -> Result<DeviceId, ChannelDevice> {
        self.insert(None, device.into())
    }

    /// Append a device that controls can bind to by name
    ///
    /// Names longer than [`DEVICE_NAME_LEN`] bytes are truncated.
    pub fn add_named(
        &mut self,
        name: &str,
        device: impl Into<ChannelDevice>,
    ) -> Result<DeviceId, ChannelDevice> {
        self.insert(Some(truncated_name(name)), device.into())
    }

    fn insert(
        &mut self,
        name: Option<DeviceName>,
        device: ChannelDevice,
    ) -> Result<DeviceId, ChannelDevice> {
        let id = DeviceId(self.next_id);
        self.entries
            .push(Entry { id, name, device })
            .map_err(|entry| entry.device)?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }

    /// Remove a device, shifting all later devices down by its channels
    pub fn remove(&mut self, id: DeviceId) -> Option<ChannelDevice> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index).device)
    }

    pub fn get(&self, id: DeviceId) -> Option<&ChannelDevice> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.device)
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut ChannelDevice> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(|entry| &mut entry.device)
    }

    /// Iterate devices in channel order
    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &ChannelDevice)> {
        self.entries.iter().map(|entry| (entry.id, &entry.device))
    }

    /// Channels used by all devices together
    pub fn channel_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| usize::from(entry.device.channel_count()))
            .sum()
    }

    /// Offset of a named device's first channel from the registry's first
    /// channel
    pub fn channel_offset_of(&self, name: &str) -> Option<u16> {
        self.find(name).map(|(offset, _)| offset)
    }

    /// Look up a named device with its channel offset
    pub fn find(&self, name: &str) -> Option<(u16, &ChannelDevice)> {
        let mut offset = 0u16;
        for entry in &self.entries {
            if entry.name.as_deref() == Some(name) {
                return Some((offset, &entry.device));
            }
            offset = offset.saturating_add(entry.device.channel_count());
        }
        None
    }

    /// Distribute a DMX frame over the devices
    ///
    /// Stops at the first device whose channels run past the end of `data`;
    /// that device and all following ones keep their state.
    pub fn apply<B: OutputBus + ?Sized>(&mut self, data: &[u8], bus: &mut B) -> ApplyReport {
        let start = usize::from(self.first_channel.saturating_sub(1));
        let mut offset = start;
        let mut report = ApplyReport::default();
        for entry in &mut self.entries {
            let end = offset + usize::from(entry.device.channel_count());
            let Some(channels) = data.get(offset..end) else {
                log::warn!(
                    "frame too short for device {}: needs channels {}..{}, got {}",
                    entry.id.0,
                    offset + 1,
                    end,
                    data.len()
                );
                report.truncated = true;
                break;
            };
            entry.device.apply(channels, bus);
            report.applied += 1;
            offset = end;
        }
        report.channels = offset - start;
        report
    }

    /// Advance every animated device by one frame
    pub fn animate<B, O>(&mut self, bus: &mut B, observer: &mut O)
    where
        B: OutputBus + ?Sized,
        O: AnimationObserver + ?Sized,
    {
        for entry in &mut self.entries {
            let events = entry.device.animate(bus);
            for event in events.iter() {
                log::trace!("device {} raised {:?}", entry.id.0, event);
                observer.on_event(entry.id, event);
            }
        }
    }

    /// Switch every switchable device fully on or off
    pub fn switch_all<B: OutputBus + ?Sized>(&mut self, on: bool, bus: &mut B) {
        for entry in &mut self.entries {
            entry.device.switch(on, bus);
        }
    }
}

fn truncated_name(name: &str) -> DeviceName {
    let mut truncated = DeviceName::new();
    for c in name.chars() {
        if truncated.push(c).is_err() {
            log::warn!(
                "device name {:?} is longer than {} bytes, truncated",
                name,
                DEVICE_NAME_LEN
            );
            break;
        }
    }
    truncated
}
