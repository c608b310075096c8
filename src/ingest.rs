//! DMX frame intake.
//!
//! The network task filters incoming frames with [`FrameIngest`] and stores
//! accepted ones in a [`FrameBuffer`]; the control loop reads the buffer on
//! its own schedule. Both sides run without locking each other out: every
//! channel byte is an atomic, so a reader may see a mix of two frames but
//! never a torn byte.

use core::cell::Cell;
use core::sync::atomic::{AtomicU8, Ordering};

use critical_section::Mutex;
use embassy_time::Instant;

/// Channels in one DMX universe
pub const DMX_UNIVERSE_SIZE: usize = 512;

/// A sequence number this far behind the last accepted one is treated as
/// wrap-around rather than a late frame
pub const SEQUENCE_WRAP_THRESHOLD: u8 = 10;

/// Universe-sized channel buffer shared between intake and control loop
pub struct FrameBuffer {
    channels: [AtomicU8; DMX_UNIVERSE_SIZE],
    received_at: Mutex<Cell<Option<Instant>>>,
}

impl FrameBuffer {
    /// Create a buffer with every channel at zero
    pub const fn new() -> Self {
        Self {
            channels: [const { AtomicU8::new(0) }; DMX_UNIVERSE_SIZE],
            received_at: Mutex::new(Cell::new(None)),
        }
    }

    /// Overwrite the buffer with `data`
    ///
    /// Channels past the end of `data` are cleared; bytes past the universe
    /// are ignored.
    pub fn replace(&self, data: &[u8]) {
        for (i, channel) in self.channels.iter().enumerate() {
            channel.store(data.get(i).copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Write one channel, 0-based; out-of-range indices are ignored
    pub fn set(&self, index: usize, value: u8) {
        if let Some(channel) = self.channels.get(index) {
            channel.store(value, Ordering::Relaxed);
        }
    }

    /// Read one channel, 0-based
    pub fn get(&self, index: usize) -> Option<u8> {
        self.channels
            .get(index)
            .map(|channel| channel.load(Ordering::Relaxed))
    }

    /// Copy the current channels into `out`
    pub fn read_into(&self, out: &mut [u8; DMX_UNIVERSE_SIZE]) {
        for (byte, channel) in out.iter_mut().zip(&self.channels) {
            *byte = channel.load(Ordering::Relaxed);
        }
    }

    /// Copy of the current channels
    pub fn snapshot(&self) -> [u8; DMX_UNIVERSE_SIZE] {
        let mut out = [0; DMX_UNIVERSE_SIZE];
        self.read_into(&mut out);
        out
    }

    /// Record that a network frame arrived
    pub fn mark_received(&self, now: Instant) {
        critical_section::with(|cs| self.received_at.borrow(cs).set(Some(now)));
    }

    /// Arrival time of the last accepted network frame
    pub fn last_received(&self) -> Option<Instant> {
        critical_section::with(|cs| self.received_at.borrow(cs).get())
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// A received DMX packet
#[derive(Debug, Clone, Copy)]
pub struct DmxPacket<'a> {
    pub universe: u16,
    /// Sender sequence, 0 when the sender does not number its packets
    pub sequence: u8,
    pub data: &'a [u8],
}

/// What happened to an incoming packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Stored in the frame buffer
    Accepted,
    /// Addressed to another universe
    WrongUniverse,
    /// Arrived after a newer packet
    OutOfOrder,
}

/// Filters packets and writes accepted ones into a [`FrameBuffer`]
pub struct FrameIngest<'a> {
    buffer: &'a FrameBuffer,
    universe: u16,
    last_sequence: u8,
}

impl<'a> FrameIngest<'a> {
    pub const fn new(buffer: &'a FrameBuffer, universe: u16) -> Self {
        Self {
            buffer,
            universe,
            last_sequence: 0,
        }
    }

    pub const fn universe(&self) -> u16 {
        self.universe
    }

    /// Sequence of the last accepted packet
    pub const fn last_sequence(&self) -> u8 {
        self.last_sequence
    }

    /// Check if `sequence` is slightly behind the last accepted one
    ///
    /// Large steps back are sequence wrap-around and pass.
    pub const fn is_out_of_order(&self, sequence: u8) -> bool {
        sequence < self.last_sequence && self.last_sequence - sequence < SEQUENCE_WRAP_THRESHOLD
    }

    /// Filter a packet and store it if accepted
    pub fn ingest(&mut self, packet: &DmxPacket<'_>, now: Instant) -> IngestOutcome {
        if packet.universe != self.universe {
            log::trace!(
                "ignoring universe {}, listening on {}",
                packet.universe,
                self.universe
            );
            return IngestOutcome::WrongUniverse;
        }
        if self.is_out_of_order(packet.sequence) {
            log::trace!(
                "dropping sequence {} after {}",
                packet.sequence,
                self.last_sequence
            );
            return IngestOutcome::OutOfOrder;
        }
        self.last_sequence = packet.sequence;
        self.buffer.replace(packet.data);
        self.buffer.mark_received(now);
        IngestOutcome::Accepted
    }
}
