//! The controller's main cycle.
//!
//! Each cycle ticks the animations when a frame is due and, every commit
//! interval, distributes the latest DMX frame over the devices, stores a
//! snapshot if the console asked for one, and hands the outputs to the
//! flush context.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant};

use crate::animation::{AnimationEngine, AnimationObserver};
use crate::commit::CommitCoordinator;
use crate::config::ControllerConfig;
use crate::ingest::{DMX_UNIVERSE_SIZE, FrameBuffer};
use crate::output::OutputBus;
use crate::persistence::{PersistentStore, SnapshotStore};
use crate::registry::{ApplyReport, DeviceRegistry};

/// What happened during one [`ControlLoop::cycle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleResult {
    /// An animation frame was rendered
    pub animated: bool,
    /// The frame was applied and flushed
    pub committed: Option<ApplyReport>,
    /// A snapshot was written to the store
    pub snapshot_stored: bool,
    /// No network frame arrived within the configured idle time
    pub idle: bool,
    /// When the next cycle has work to do
    pub next_deadline: Instant,
}

/// Drives devices from the shared [`FrameBuffer`]
pub struct ControlLoop<'a, S, const N: usize> {
    frames: &'a FrameBuffer,
    registry: DeviceRegistry<N>,
    engine: AnimationEngine,
    snapshots: SnapshotStore<S>,
    commit_interval: Duration,
    max_idle: Option<Duration>,
    next_commit: Option<Instant>,
    started_at: Option<Instant>,
    frame: [u8; DMX_UNIVERSE_SIZE],
}

impl<'a, S: PersistentStore, const N: usize> ControlLoop<'a, S, N> {
    pub fn new(
        frames: &'a FrameBuffer,
        registry: DeviceRegistry<N>,
        snapshots: SnapshotStore<S>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            frames,
            registry,
            engine: AnimationEngine::new(&config.engine),
            snapshots,
            commit_interval: config.control.commit_interval(),
            max_idle: config.control.max_idle(),
            next_commit: None,
            started_at: None,
            frame: [0; DMX_UNIVERSE_SIZE],
        }
    }

    pub const fn registry(&self) -> &DeviceRegistry<N> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DeviceRegistry<N> {
        &mut self.registry
    }

    pub fn snapshots_mut(&mut self) -> &mut SnapshotStore<S> {
        &mut self.snapshots
    }

    /// The frame applied by the last commit
    pub const fn last_frame(&self) -> &[u8; DMX_UNIVERSE_SIZE] {
        &self.frame
    }

    /// Load the stored snapshot into the frame buffer
    ///
    /// Call once at boot, before the first frame arrives.
    pub fn restore(&mut self) -> bool {
        let mut frame = [0; DMX_UNIVERSE_SIZE];
        if !self.snapshots.restore_snapshot(&mut frame) {
            return false;
        }
        self.frames.replace(&frame);
        true
    }

    /// Run one cycle
    ///
    /// The outputs are moved through the commit coordinator while flushing
    /// and returned with the result.
    pub async fn cycle<B, M, O>(
        &mut self,
        now: Instant,
        mut outputs: B,
        commits: &CommitCoordinator<B, M>,
        observer: &mut O,
    ) -> (B, CycleResult)
    where
        B: OutputBus,
        M: RawMutex,
        O: AnimationObserver + ?Sized,
    {
        let started_at = *self.started_at.get_or_insert(now);

        let animated = self
            .engine
            .poll(now, &mut self.registry, &mut outputs, observer)
            .is_some();

        let mut committed = None;
        let mut snapshot_stored = false;
        if self.next_commit.is_none_or(|deadline| now >= deadline) {
            self.frames.read_into(&mut self.frame);
            let report = self.registry.apply(&self.frame, &mut outputs);
            snapshot_stored = self.snapshots.store_snapshot(&self.frame);
            outputs = commits.flush(outputs).await;
            self.next_commit = Some(now + self.commit_interval);
            committed = Some(report);
        }

        let idle = self.max_idle.is_some_and(|max_idle| {
            let since = self.frames.last_received().unwrap_or(started_at);
            now.saturating_duration_since(since) > max_idle
        });
        if idle {
            log::debug!("no frame received within the idle time");
        }

        let next_commit = self.next_commit.unwrap_or(now);
        let next_deadline = self
            .engine
            .next_deadline()
            .map_or(next_commit, |frame| frame.min(next_commit));

        let result = CycleResult {
            animated,
            committed,
            snapshot_stored,
            idle,
            next_deadline,
        };
        (outputs, result)
    }

    /// Switch every switchable device fully on or off and flush
    pub async fn switch_all<B, M>(
        &mut self,
        on: bool,
        mut outputs: B,
        commits: &CommitCoordinator<B, M>,
    ) -> B
    where
        B: OutputBus,
        M: RawMutex,
    {
        self.registry.switch_all(on, &mut outputs);
        commits.flush(outputs).await
    }
}
