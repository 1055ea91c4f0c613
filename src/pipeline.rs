//! High-level API: one pipeline per direction.
//!
//! A pipeline owns the worker thread doing the hardware I/O and hands back
//! the [`NodeHost`] the audio callback drives. The two halves only share a
//! lock-free queue, a bounded channel and a couple of atomics, so the
//! callback never waits on the hardware.
//!
//! # Example
//!
//! ```no_run
//! use cvbridge::{CapturePipeline, Config, ProcessContext, SwitchBank};
//!
//! let config = Config::from_env().with_device("/sys/bus/iio/devices/iio:device0");
//! let ctx = ProcessContext::new(48_000, config.block_size);
//! let (pipeline, mut host) =
//!     CapturePipeline::open(&config, None::<SwitchBank>, ctx).unwrap();
//!
//! // in the audio callback
//! host.process();
//! let capture_1 = &host.outputs()[0];
//! # drop(pipeline);
//! ```

use std::sync::Arc;

use crossbeam_channel::bounded;
use tracing::info;

use crate::config::Config;
use crate::control::ControlSurface;
use crate::error::SetupError;
use crate::host::{attach, NodeHost};
use crate::node::ProcessContext;
use crate::nodes::{CvCapture, CvPlayback};
use crate::register::{IioDevice, Register, SysfsRegister};
use crate::worker::poller::Poller;
use crate::worker::writer::Writer;
use crate::worker::{Cadence, Worker, WorkerState};

/// Pending reduced pairs between the playback node and its writer.
const HANDOFF_CAPACITY: usize = 4;

fn open_device(config: &Config) -> Result<IioDevice, SetupError> {
    let dir = config.device.as_ref().ok_or(SetupError::NoDevice)?;
    IioDevice::open(dir)
}

/// Hardware inputs → audio outputs `capture_1`, `capture_2`, `exp_pedal`.
pub struct CapturePipeline {
    worker: Worker,
}

impl CapturePipeline {
    /// Start polling `registers` and return the node host for the callback.
    ///
    /// The host stays silent until both registers have been read once.
    pub fn start<R, C>(
        config: &Config,
        registers: [R; 2],
        control: Option<C>,
        ctx: ProcessContext,
    ) -> Result<(Self, NodeHost<CvCapture>), SetupError>
    where
        R: Register,
        C: ControlSurface,
    {
        let cadence = Arc::new(Cadence::new(&ctx));
        let node = CvCapture::new(config.prescaled).with_cadence(cadence.clone());
        let (host, handle) = attach(node, ctx, config.queue_size);

        let poller = Poller::new(registers, control, config.quantizer(), handle, cadence);
        let worker = Worker::spawn("cv-capture", move |run| poller.run(run))?;

        info!(
            sample_rate = ctx.sample_rate,
            block_size = ctx.buffer_size,
            prescaled = config.prescaled,
            "capture pipeline started"
        );

        Ok((Self { worker }, host))
    }

    /// [`start`](Self::start) on the ADC registers of `config.device`.
    pub fn open<C: ControlSurface>(
        config: &Config,
        control: Option<C>,
        ctx: ProcessContext,
    ) -> Result<(Self, NodeHost<CvCapture>), SetupError> {
        let registers: [SysfsRegister; 2] = open_device(config)?.capture_registers()?;
        Self::start(config, registers, control, ctx)
    }

    #[inline]
    pub fn worker_state(&self) -> WorkerState {
        self.worker.state()
    }

    /// Stop and join the poller.
    pub fn shutdown(mut self) {
        self.worker.stop();
        info!("capture pipeline stopped");
    }
}

/// Audio inputs `playback_1`, `playback_2` → hardware outputs.
pub struct PlaybackPipeline {
    worker: Worker,
}

impl PlaybackPipeline {
    /// Start the writer on `registers` and return the node host for the
    /// callback.
    pub fn start<R, C>(
        config: &Config,
        registers: [R; 2],
        control: Option<C>,
        ctx: ProcessContext,
    ) -> Result<(Self, NodeHost<CvPlayback>), SetupError>
    where
        R: Register,
        C: ControlSurface,
    {
        let (tx, rx) = bounded(HANDOFF_CAPACITY);
        let (host, handle) = attach(CvPlayback::new(tx), ctx, config.queue_size);

        let writer = Writer::new(registers, control, config.quantizer(), handle, rx)
            .with_timeout(config.writer_timeout);
        let worker = Worker::spawn("cv-playback", move |run| writer.run(run))?;

        info!(
            sample_rate = ctx.sample_rate,
            block_size = ctx.buffer_size,
            "playback pipeline started"
        );

        Ok((Self { worker }, host))
    }

    /// [`start`](Self::start) on the DAC registers of `config.device`.
    pub fn open<C: ControlSurface>(
        config: &Config,
        control: Option<C>,
        ctx: ProcessContext,
    ) -> Result<(Self, NodeHost<CvPlayback>), SetupError> {
        let registers: [SysfsRegister; 2] = open_device(config)?.playback_registers()?;
        Self::start(config, registers, control, ctx)
    }

    #[inline]
    pub fn worker_state(&self) -> WorkerState {
        self.worker.state()
    }

    /// Stop and join the writer. Waits at most one writer timeout.
    pub fn shutdown(mut self) {
        self.worker.stop();
        info!("playback pipeline stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::SwitchBank;

    #[test]
    fn missing_device_fails_before_spawning() {
        let ctx = ProcessContext::new(48_000, 128);
        let result = CapturePipeline::open(&Config::default(), None::<SwitchBank>, ctx);
        assert!(matches!(result, Err(SetupError::NoDevice)));

        let result = PlaybackPipeline::open(&Config::default(), None::<SwitchBank>, ctx);
        assert!(matches!(result, Err(SetupError::NoDevice)));
    }
}
