//! Hand-off of staged outputs to the flush context.
//!
//! The control loop owns the [`OutputBus`] while it applies a frame. To
//! commit, it sends the bus to the flush context and waits for it to come
//! back, so nothing can stage new state while the hardware is being written.

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::Channel;

use crate::output::OutputBus;

/// Ownership ping-pong between the control loop and the flush context
///
/// Both queues hold a single item: at most one flush is in flight.
pub struct CommitCoordinator<T, M: RawMutex = CriticalSectionRawMutex> {
    requests: Channel<M, T, 1>,
    completions: Channel<M, T, 1>,
}

impl<T, M: RawMutex> CommitCoordinator<T, M> {
    pub const fn new() -> Self {
        Self {
            requests: Channel::new(),
            completions: Channel::new(),
        }
    }

    /// Send `outputs` to the flush context and wait until it has been
    /// flushed
    pub async fn flush(&self, outputs: T) -> T {
        self.requests.send(outputs).await;
        self.completions.receive().await
    }

    /// Wait for the next flush request (flush context side)
    pub async fn next_request(&self) -> T {
        self.requests.receive().await
    }

    /// Hand flushed outputs back to the waiting caller
    pub async fn complete(&self, outputs: T) {
        self.completions.send(outputs).await;
    }
}

impl<T: OutputBus, M: RawMutex> CommitCoordinator<T, M> {
    /// Serve a single flush request
    pub async fn serve_once(&self) {
        let mut outputs = self.next_request().await;
        outputs.flush();
        self.complete(outputs).await;
    }

    /// Serve flush requests forever
    pub async fn run_flusher(&self) -> ! {
        loop {
            self.serve_once().await;
        }
    }
}

impl<T, M: RawMutex> Default for CommitCoordinator<T, M> {
    fn default() -> Self {
        Self::new()
    }
}
