//! Playback direction: [`CvPlayback`](crate::nodes::CvPlayback) → hardware registers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info, warn};

use crate::control::ControlSurface;
use crate::host::Handle;
use crate::mode::PlaybackMode;
use crate::nodes::sink::cv_playback::CHANNELS;
use crate::nodes::{PlaybackMessage, Reduced};
use crate::quantize::Quantizer;
use crate::register::Register;

/// Default bound on how long the writer waits for new values before polling
/// the control surface again.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Waits for reduced values from the playback node and writes them out.
///
/// Writes are best effort: a failed write is logged and the next value
/// overwrites it anyway.
pub struct Writer<R: Register, C: ControlSurface> {
    registers: [R; CHANNELS],
    control: Option<C>,
    quantizer: Quantizer,
    handle: Handle<PlaybackMessage>,
    handoff: Receiver<Reduced>,
    timeout: Duration,
    mode: PlaybackMode,
    sent_mode: PlaybackMode,
    failing: [bool; CHANNELS],
}

impl<R: Register, C: ControlSurface> Writer<R, C> {
    /// A control surface without the playback switch is dropped here and
    /// playback stays enabled.
    pub fn new(
        registers: [R; CHANNELS],
        control: Option<C>,
        quantizer: Quantizer,
        handle: Handle<PlaybackMessage>,
        handoff: Receiver<Reduced>,
    ) -> Self {
        let control = control.filter(|c| {
            let usable = PlaybackMode::poll(c).is_some();
            if !usable {
                warn!("control surface lacks the cv mode switch, playback stays enabled");
            }
            usable
        });

        Self {
            registers,
            control,
            quantizer,
            handle,
            handoff,
            timeout: DEFAULT_TIMEOUT,
            mode: PlaybackMode::default(),
            sent_mode: PlaybackMode::default(),
            failing: [false; CHANNELS],
        }
    }

    /// Bound the wait for new values.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline]
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// One cycle: poll the switch, wait for a value, write the newest one.
    ///
    /// Returns `false` once the playback node is gone and no value can ever
    /// arrive again.
    pub fn cycle(&mut self) -> bool {
        self.poll_mode();

        match self.handoff.recv_timeout(self.timeout) {
            Ok(first) => {
                // only the newest pair matters
                let latest = self.handoff.try_iter().last().unwrap_or(first);
                self.write(latest);
                true
            }
            Err(RecvTimeoutError::Timeout) => true,
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Cycle until `run` goes false or the playback node goes away.
    pub fn run(mut self, run: Arc<AtomicBool>) {
        info!("playback writer running");

        while run.load(Ordering::Acquire) {
            if !self.cycle() {
                info!("playback node dropped");
                break;
            }
        }

        info!("playback writer stopped");
    }

    fn write(&mut self, reduced: Reduced) {
        for (channel, &value) in reduced.values.iter().enumerate() {
            let raw = if self.mode.is_enabled() {
                self.quantizer.quantize(value)
            } else {
                0
            };

            match self.registers[channel].write_raw(raw) {
                Ok(()) => {
                    if self.failing[channel] {
                        info!(channel, "playback register writable again");
                        self.failing[channel] = false;
                    }
                }
                Err(err) if self.failing[channel] => debug!(channel, %err, "playback write failed"),
                Err(err) => {
                    warn!(channel, %err, "playback write failed, retrying with next value");
                    self.failing[channel] = true;
                }
            }
        }
    }

    fn poll_mode(&mut self) {
        if let Some(control) = self.control.as_mut() {
            control.refresh();
            self.mode = PlaybackMode::poll(&*control).unwrap_or_default();
        }

        if self.mode != self.sent_mode && self.handle.send(PlaybackMessage::SetMode(self.mode)).is_ok() {
            debug!(mode = ?self.mode, "playback mode changed");
            self.sent_mode = self.mode;
        }
    }
}
