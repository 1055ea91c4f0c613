//! Capture direction: hardware registers → [`CvCapture`](crate::nodes::CvCapture).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::control::ControlSurface;
use crate::host::Handle;
use crate::mode::PedalMode;
use crate::nodes::source::cv_capture::CHANNELS;
use crate::nodes::CaptureMessage;
use crate::quantize::Quantizer;
use crate::register::Register;
use crate::worker::Cadence;

/// Shortest sleep between two polls, whatever the host's block size.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_micros(250);

/// Reads the capture registers and the routing switches once per host
/// block and forwards what it finds to the capture node.
///
/// A failed read keeps the node on its previous value. Nothing reaches the
/// node before both channels have been read once.
pub struct Poller<R: Register, C: ControlSurface> {
    registers: [R; CHANNELS],
    control: Option<C>,
    quantizer: Quantizer,
    handle: Handle<CaptureMessage>,
    cadence: Arc<Cadence>,
    primed: bool,
    sent_mode: PedalMode,
    failing: [bool; CHANNELS],
}

impl<R: Register, C: ControlSurface> Poller<R, C> {
    /// A control surface without both routing switches is dropped here and
    /// the node stays in [`PedalMode::Unused`].
    pub fn new(
        registers: [R; CHANNELS],
        control: Option<C>,
        quantizer: Quantizer,
        handle: Handle<CaptureMessage>,
        cadence: Arc<Cadence>,
    ) -> Self {
        let control = control.filter(|c| {
            let usable = PedalMode::poll(c).is_some();
            if !usable {
                warn!("control surface lacks pedal mode switches, pedal port stays unused");
            }
            usable
        });

        Self {
            registers,
            control,
            quantizer,
            handle,
            cadence,
            primed: false,
            sent_mode: PedalMode::default(),
            failing: [false; CHANNELS],
        }
    }

    /// Whether the node has been sent its first reading.
    #[inline]
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// One poll cycle without the sleep.
    pub fn poll_once(&mut self) {
        if self.primed {
            self.poll_registers();
        } else {
            self.prime();
        }
        self.poll_mode();
    }

    /// Poll until `run` goes false or the capture node goes away, sleeping
    /// one host block between cycles.
    pub fn run(mut self, run: Arc<AtomicBool>) {
        info!("capture poller running");

        while run.load(Ordering::Acquire) {
            if self.handle.is_abandoned() {
                info!("capture node dropped");
                break;
            }
            self.poll_once();
            thread::sleep(self.cadence.interval().max(MIN_POLL_INTERVAL));
        }

        info!("capture poller stopped");
    }

    fn read(&mut self, channel: usize) -> Option<f32> {
        match self.registers[channel].read_raw() {
            Ok(raw) => {
                if self.failing[channel] {
                    info!(channel, "capture register readable again");
                    self.failing[channel] = false;
                }
                Some(self.quantizer.dequantize(raw))
            }
            Err(err) => {
                if self.failing[channel] {
                    debug!(channel, %err, "capture read failed");
                } else {
                    warn!(channel, %err, "capture read failed, keeping previous value");
                    self.failing[channel] = true;
                }
                None
            }
        }
    }

    fn prime(&mut self) {
        let mut values = [0.0; CHANNELS];
        for (channel, value) in values.iter_mut().enumerate() {
            match self.read(channel) {
                Some(v) => *value = v,
                None => return,
            }
        }

        if self.handle.send(CaptureMessage::Prime(values)).is_ok() {
            debug!(?values, "capture primed");
            self.primed = true;
        }
    }

    fn poll_registers(&mut self) {
        for channel in 0..CHANNELS {
            if let Some(value) = self.read(channel) {
                if self.handle.send(CaptureMessage::Sample { channel, value }).is_err() {
                    trace!(channel, "capture queue full, reading dropped");
                }
            }
        }
    }

    fn poll_mode(&mut self) {
        let control = match self.control.as_mut() {
            Some(control) => control,
            None => return,
        };

        control.refresh();
        let mode = PedalMode::poll(&*control).unwrap_or_default();

        // only record the mode once the node has it
        if mode != self.sent_mode && self.handle.send(CaptureMessage::SetMode(mode)).is_ok() {
            debug!(?mode, "pedal mode changed");
            self.sent_mode = mode;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{SwitchBank, CV_EXP_MODE};
    use crate::error::RegisterError;
    use crate::host::attach;
    use crate::node::ProcessContext;
    use crate::nodes::CvCapture;
    use std::collections::VecDeque;
    use std::io;

    /// Replays a script of readings; `None` is a failed read.
    struct Scripted(VecDeque<Option<i64>>);

    impl Register for Scripted {
        fn read_raw(&mut self) -> Result<i64, RegisterError> {
            match self.0.pop_front().flatten() {
                Some(raw) => Ok(raw),
                None => Err(RegisterError::Io(io::Error::new(io::ErrorKind::Other, "gone"))),
            }
        }

        fn write_raw(&mut self, _raw: u32) -> Result<(), RegisterError> {
            Ok(())
        }
    }

    fn scripted(values: &[Option<i64>]) -> Scripted {
        Scripted(values.iter().copied().collect())
    }

    fn poller(
        a: &[Option<i64>],
        b: &[Option<i64>],
        control: Option<SwitchBank>,
    ) -> (Poller<Scripted, SwitchBank>, crate::host::NodeHost<CvCapture>) {
        let ctx = ProcessContext::new(48_000, 128);
        let (host, handle) = attach(CvCapture::new(false), ctx, 16);
        let poller = Poller::new(
            [scripted(a), scripted(b)],
            control,
            Quantizer::default(),
            handle,
            Arc::new(Cadence::new(&ctx)),
        );
        (poller, host)
    }

    #[test]
    fn primes_once_both_channels_read() {
        let (mut poller, mut host) = poller(&[Some(4095), Some(4095)], &[None, Some(0)], None);

        poller.poll_once();
        assert!(!poller.is_primed());
        host.process();
        assert!(!host.node().is_ready());

        poller.poll_once();
        assert!(poller.is_primed());
        host.process();
        assert!(host.node().is_ready());
        assert_eq!(host.node().current(), [10.0, 0.0]);
    }

    #[test]
    fn failed_read_keeps_previous_value() {
        let (mut poller, mut host) =
            poller(&[Some(0), None, Some(4095)], &[Some(0), Some(4095), None], None);

        poller.poll_once();
        poller.poll_once();
        host.process();
        assert_eq!(host.node().current(), [0.0, 10.0]);

        poller.poll_once();
        host.process();
        assert_eq!(host.node().current(), [10.0, 10.0]);
    }

    #[test]
    fn readings_are_clamped() {
        let (mut poller, mut host) = poller(&[Some(9000)], &[Some(-40)], None);
        poller.poll_once();
        host.process();
        assert_eq!(host.node().current(), [10.0, 0.0]);
    }

    #[test]
    fn mode_follows_switches() {
        let bank = SwitchBank::capture(true, false);
        let (mut poller, mut host) =
            poller(&[Some(1), Some(1)], &[Some(1), Some(1)], Some(bank.clone()));

        poller.poll_once();
        host.process();
        assert_eq!(host.node().mode(), PedalMode::Port1);

        bank.set(CV_EXP_MODE, false);
        poller.poll_once();
        host.process();
        assert_eq!(host.node().mode(), PedalMode::Unused);
    }

    #[test]
    fn dropped_node_ends_the_loop() {
        let (poller, host) = poller(&[Some(1)], &[Some(1)], None);
        drop(host);

        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        thread::spawn(move || {
            poller.run(Arc::new(AtomicBool::new(true)));
            done_tx.send(()).ok();
        });
        assert!(done_rx.recv_timeout(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn incomplete_control_surface_is_ignored() {
        let bank = SwitchBank::new([(CV_EXP_MODE, true)]);
        let (mut poller, mut host) = poller(&[Some(1)], &[Some(1)], Some(bank));

        poller.poll_once();
        host.process();
        assert_eq!(host.node().mode(), PedalMode::Unused);
    }
}
