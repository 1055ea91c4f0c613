//! Low-priority threads that do the blocking hardware I/O.
//!
//! - [`poller`]: reads the capture registers on a timer
//! - [`writer`]: writes the playback registers when a new value is ready
//!
//! Both are plain OS threads owned by a [`Worker`], stopped through a run
//! flag that the loop checks at the top of every iteration.

pub mod poller;
pub mod writer;

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::SetupError;
use crate::node::ProcessContext;

/// Lifecycle of a worker thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    /// Run flag cleared, thread not joined yet.
    Stopping,
    Joined,
}

/// A named worker thread with a cooperative stop flag.
pub struct Worker {
    name: &'static str,
    run: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    state: WorkerState,
}

impl Worker {
    /// Spawn `body` on a new thread. `body` gets the run flag and must return
    /// soon after it goes false.
    pub fn spawn<F>(name: &'static str, body: F) -> Result<Self, SetupError>
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        let run = Arc::new(AtomicBool::new(true));
        let flag = run.clone();

        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || body(flag))
            .map_err(|source: io::Error| SetupError::Spawn { name, source })?;

        debug!(worker = name, "worker started");

        Ok(Self {
            name,
            run,
            handle: Some(handle),
            state: WorkerState::Running,
        })
    }

    #[inline]
    pub fn state(&self) -> WorkerState {
        self.state
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ask the thread to stop without waiting for it.
    pub fn request_stop(&mut self) {
        if self.state == WorkerState::Running {
            self.run.store(false, Ordering::Release);
            self.state = WorkerState::Stopping;
        }
    }

    /// Stop the thread and wait for it to exit.
    ///
    /// Returns once the thread is joined; the wait is bounded by the loop's
    /// sleep or receive timeout.
    pub fn stop(&mut self) {
        self.request_stop();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(worker = self.name, "worker panicked");
            }
            debug!(worker = self.name, "worker joined");
        }
        self.state = WorkerState::Joined;
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Host block timing shared with the poller.
///
/// Written by whoever receives block-size notifications, read by the poller
/// once per cycle. Each field is a single word with a single writer, so a
/// torn pair costs at most one oddly timed sleep.
#[derive(Debug)]
pub struct Cadence {
    block_size: AtomicUsize,
    sample_rate: AtomicU32,
}

impl Cadence {
    pub fn new(ctx: &ProcessContext) -> Self {
        Self {
            block_size: AtomicUsize::new(ctx.buffer_size),
            sample_rate: AtomicU32::new(ctx.sample_rate),
        }
    }

    pub fn update(&self, ctx: &ProcessContext) {
        self.block_size.store(ctx.buffer_size, Ordering::Relaxed);
        self.sample_rate.store(ctx.sample_rate, Ordering::Relaxed);
    }

    /// Duration of one host block.
    pub fn interval(&self) -> Duration {
        let ctx = ProcessContext::new(
            self.sample_rate.load(Ordering::Relaxed),
            self.block_size.load(Ordering::Relaxed),
        );
        Duration::from_secs_f64(ctx.block_seconds())
    }
}
