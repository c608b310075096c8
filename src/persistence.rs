//! Frame snapshots in non-volatile storage.
//!
//! A console stores the current look by raising the trigger channel. The
//! frame is written with the trigger cleared, so restoring it at boot does
//! not immediately store it again.

use crate::ingest::DMX_UNIVERSE_SIZE;

/// Storage key of the frame snapshot
pub const SNAPSHOT_KEY: &str = "dmx-state/data";

/// Default trigger: the last channel of the universe
pub const DEFAULT_TRIGGER_INDEX: usize = DMX_UNIVERSE_SIZE - 1;

/// Error type for the store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    Busy,
    DriverError,
    InvalidData,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Busy => f.write_str("store busy"),
            Self::DriverError => f.write_str("store driver error"),
            Self::InvalidData => f.write_str("invalid stored data"),
        }
    }
}

/// Key-value store that survives power loss
pub trait PersistentStore {
    /// Read the value of `key` into `buffer`
    ///
    /// Returns the value length, or `None` if the key was never written.
    fn load(&mut self, key: &str, buffer: &mut [u8]) -> Result<Option<usize>, StoreError>;

    /// Replace the value of `key`
    fn save(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError>;
}

impl<S: PersistentStore + ?Sized> PersistentStore for &mut S {
    fn load(&mut self, key: &str, buffer: &mut [u8]) -> Result<Option<usize>, StoreError> {
        (**self).load(key, buffer)
    }

    fn save(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        (**self).save(key, data)
    }
}

/// Stores and restores whole DMX frames
pub struct SnapshotStore<S> {
    store: S,
    trigger_index: usize,
    last_trigger: u8,
}

impl<S: PersistentStore> SnapshotStore<S> {
    pub const fn new(store: S) -> Self {
        Self::with_trigger(store, DEFAULT_TRIGGER_INDEX)
    }

    /// Use another channel (0-based) as the store trigger
    pub const fn with_trigger(store: S, trigger_index: usize) -> Self {
        Self {
            store,
            trigger_index,
            last_trigger: 0,
        }
    }

    pub const fn trigger_index(&self) -> usize {
        self.trigger_index
    }

    pub fn store(&mut self) -> &mut S {
        &mut self.store
    }

    /// Store `frame` if its trigger channel went from zero to nonzero since
    /// the previous call
    ///
    /// Returns `true` if the store was written.
    pub fn store_snapshot(&mut self, frame: &[u8; DMX_UNIVERSE_SIZE]) -> bool {
        let trigger = frame.get(self.trigger_index).copied().unwrap_or(0);
        let raised = self.last_trigger == 0 && trigger != 0;
        self.last_trigger = trigger;
        if !raised {
            return false;
        }
        self.store_now(frame)
    }

    /// Store `frame` unless the stored snapshot already matches it
    ///
    /// Write failures are logged and reported as `false`.
    pub fn store_now(&mut self, frame: &[u8; DMX_UNIVERSE_SIZE]) -> bool {
        let mut payload = *frame;
        self.clear_trigger(&mut payload);

        let mut stored = [0u8; DMX_UNIVERSE_SIZE];
        if let Err(err) = self.store.load(SNAPSHOT_KEY, &mut stored) {
            log::warn!("failed to read stored snapshot: {}", err);
        }
        if stored == payload {
            log::debug!("snapshot unchanged, skipping write");
            return false;
        }

        match self.store.save(SNAPSHOT_KEY, &payload) {
            Ok(()) => {
                log::info!("snapshot stored");
                true
            }
            Err(err) => {
                log::error!("failed to store snapshot: {}", err);
                false
            }
        }
    }

    /// Forget the stored look by storing a dark frame
    pub fn clear(&mut self) -> bool {
        self.store_now(&[0; DMX_UNIVERSE_SIZE])
    }

    /// Load the stored snapshot into `out`, trigger channel cleared
    ///
    /// Returns `false` and leaves `out` untouched if nothing is stored or the
    /// store fails.
    pub fn restore_snapshot(&mut self, out: &mut [u8; DMX_UNIVERSE_SIZE]) -> bool {
        let mut stored = [0u8; DMX_UNIVERSE_SIZE];
        match self.store.load(SNAPSHOT_KEY, &mut stored) {
            Ok(Some(len)) => {
                if len != DMX_UNIVERSE_SIZE {
                    log::warn!("stored snapshot has {} bytes, padding", len);
                    stored[len.min(DMX_UNIVERSE_SIZE)..].fill(0);
                }
                self.clear_trigger(&mut stored);
                *out = stored;
                self.last_trigger = 0;
                log::info!("snapshot restored");
                true
            }
            Ok(None) => false,
            Err(err) => {
                log::error!("failed to restore snapshot: {}", err);
                false
            }
        }
    }

    fn clear_trigger(&self, frame: &mut [u8; DMX_UNIVERSE_SIZE]) {
        if let Some(trigger) = frame.get_mut(self.trigger_index) {
            *trigger = 0;
        }
    }
}
