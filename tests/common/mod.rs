#![allow(dead_code)]

use std::collections::HashMap;

use netpins_core::output::{OutputBus, OutputPin, PixelSink, StripId};
use netpins_core::persistence::{PersistentStore, StoreError};
use netpins_core::Rgbw;

/// Strip buffer that remembers every pixel index written, in range or not
pub struct MockStrip {
    pub pixels: Vec<Rgbw>,
    pub writes: Vec<usize>,
    pub flushes: usize,
}

impl MockStrip {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![Rgbw::BLACK; len],
            writes: Vec::new(),
            flushes: 0,
        }
    }
}

impl PixelSink for MockStrip {
    fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    fn get_pixel(&self, index: usize) -> Rgbw {
        self.pixels.get(index).copied().unwrap_or_default()
    }

    fn set_pixel(&mut self, index: usize, color: Rgbw) {
        self.writes.push(index);
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

/// Output bus recording everything staged on it
#[derive(Default)]
pub struct MockBus {
    pub strips: Vec<MockStrip>,
    pub duties: Vec<(OutputPin, u16)>,
    pub angles: Vec<(OutputPin, u16)>,
    pub flushes: usize,
}

impl MockBus {
    pub fn with_strips(lengths: &[usize]) -> Self {
        Self {
            strips: lengths.iter().map(|&len| MockStrip::new(len)).collect(),
            ..Self::default()
        }
    }

    pub fn pixels(&self, strip: usize) -> &[Rgbw] {
        &self.strips[strip].pixels
    }

    pub fn last_duty(&self, pin: OutputPin) -> Option<u16> {
        self.duties
            .iter()
            .rev()
            .find(|(p, _)| *p == pin)
            .map(|(_, duty)| *duty)
    }

    pub fn clear_log(&mut self) {
        self.duties.clear();
        self.angles.clear();
        for strip in &mut self.strips {
            strip.writes.clear();
        }
    }
}

impl OutputBus for MockBus {
    fn strip(&mut self, id: StripId) -> Option<&mut dyn PixelSink> {
        self.strips
            .get_mut(usize::from(id))
            .map(|strip| strip as &mut dyn PixelSink)
    }

    fn set_duty(&mut self, pin: OutputPin, duty: u16) {
        self.duties.push((pin, duty));
    }

    fn set_angle(&mut self, pin: OutputPin, angle: u16) {
        self.angles.push((pin, angle));
    }

    fn flush(&mut self) {
        self.flushes += 1;
        for strip in &mut self.strips {
            strip.flush();
        }
    }
}

/// In-memory key-value store
#[derive(Default)]
pub struct MemoryStore {
    pub values: HashMap<String, Vec<u8>>,
    pub writes: usize,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

impl MemoryStore {
    pub fn get_i32(&self, key: &str) -> Option<i32> {
        let bytes = self.values.get(key)?;
        Some(i32::from_le_bytes(bytes.as_slice().try_into().ok()?))
    }

    pub fn set_i32(&mut self, key: &str, value: i32) {
        self.values
            .insert(key.to_string(), value.to_le_bytes().to_vec());
    }
}

impl PersistentStore for MemoryStore {
    fn load(&mut self, key: &str, buffer: &mut [u8]) -> Result<Option<usize>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::DriverError);
        }
        let Some(value) = self.values.get(key) else {
            return Ok(None);
        };
        let len = value.len().min(buffer.len());
        buffer[..len].copy_from_slice(&value[..len]);
        Ok(Some(len))
    }

    fn save(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::DriverError);
        }
        self.writes += 1;
        self.values.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}
