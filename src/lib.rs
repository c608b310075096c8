#![no_std]

pub mod animation;
pub mod binding;
pub mod color;
pub mod commit;
pub mod config;
pub mod control_loop;
pub mod device;
pub mod factory_reset;
pub mod gamma;
pub mod ingest;
pub mod math8;
pub mod output;
pub mod persistence;
pub mod registry;

pub use animation::{
    Animation, AnimationEngine, AnimationEvent, AnimationObserver, FrameEvents, PwmFadeDevice,
    TailAnimationDevice, WaveDevice,
};
pub use binding::{BindingError, ControlBinding};
pub use commit::CommitCoordinator;
pub use config::{ControlLoopConfig, ControllerConfig, DmxConfig, EngineConfig};
pub use control_loop::{ControlLoop, CycleResult};
pub use device::{ChannelDevice, DeviceGroup, Dimmer, DimmerMode, PixelSlice, Servo, SliceLayout};
pub use factory_reset::FactoryReset;
pub use ingest::{DMX_UNIVERSE_SIZE, DmxPacket, FrameBuffer, FrameIngest, IngestOutcome};
pub use output::{OutputBus, PixelSink, SmartLedStrip};
pub use persistence::{PersistentStore, SnapshotStore, StoreError};
pub use registry::{ApplyReport, DeviceId, DeviceRegistry};

pub use color::{Rgb, Rgbw};
pub use embassy_time::{Duration, Instant};

/// Route `log` records to the ESP32 serial console
#[cfg(feature = "esp32-log")]
pub fn init_logger(level: log::LevelFilter) {
    esp_println::logger::init_logger(level);
}
