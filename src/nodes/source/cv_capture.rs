//! Hardware CV readings rendered as audio-rate signals

use std::sync::Arc;

use crate::curve::LogCurve;
use crate::mode::PedalMode;
use crate::node::{AudioNode, Buffer, ProcessContext};
use crate::worker::Cadence;

/// Channels per capture device.
pub const CHANNELS: usize = 2;

/// Messages from the poller
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CaptureMessage {
    /// First successful reading of both channels. Starts output.
    Prime([f32; CHANNELS]),
    /// New reading for one channel
    Sample { channel: usize, value: f32 },
    /// New routing mode
    SetMode(PedalMode),
}

/// Turns two slowly polled CV readings into three audio outputs:
/// `capture_1`, `capture_2` and `exp_pedal`.
///
/// Every block ramps each channel from the value used in the previous block
/// to the newest reading (see [`crate::curve`]). Until the poller has primed
/// the node with a first reading, every output is silent.
///
/// All channel state lives here and is touched only by the audio thread; the
/// poller reaches it through [`CaptureMessage`]s.
pub struct CvCapture {
    current: [f32; CHANNELS],
    /// Values rendered by the last block
    previous: [f32; CHANNELS],
    ready: bool,
    mode: PedalMode,
    /// 1.0 if readings are already in the pedal's range, 0.5 otherwise
    pedal_gain: f32,
    curve: LogCurve,
    cadence: Option<Arc<Cadence>>,
}

impl CvCapture {
    /// `prescaled` tells whether readings are already in the expression
    /// pedal's range or need halving.
    pub fn new(prescaled: bool) -> Self {
        Self {
            current: [0.0; CHANNELS],
            previous: [0.0; CHANNELS],
            ready: false,
            mode: PedalMode::Unused,
            pedal_gain: if prescaled { 1.0 } else { 0.5 },
            curve: LogCurve::default(),
            cadence: None,
        }
    }

    /// Publish block-size changes to a poller.
    pub fn with_cadence(mut self, cadence: Arc<Cadence>) -> Self {
        self.cadence = Some(cadence);
        self
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[inline]
    pub fn mode(&self) -> PedalMode {
        self.mode
    }

    #[inline]
    pub fn current(&self) -> [f32; CHANNELS] {
        self.current
    }

    #[inline]
    pub fn previous(&self) -> [f32; CHANNELS] {
        self.previous
    }

    fn apply(&mut self, msg: CaptureMessage) {
        match msg {
            CaptureMessage::Prime(values) => {
                self.current = values;
                self.previous = values;
                self.ready = true;
            }
            CaptureMessage::Sample { channel, value } => {
                if let Some(slot) = self.current.get_mut(channel) {
                    *slot = value;
                }
            }
            CaptureMessage::SetMode(mode) => self.mode = mode,
        }
    }
}

fn silence(buffer: Option<&mut Buffer>) {
    if let Some(buffer) = buffer {
        buffer.iter_mut().for_each(|s| *s = 0.0);
    }
}

impl AudioNode for CvCapture {
    type Message = CaptureMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = CaptureMessage>,
        _inputs: &[Buffer],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            self.apply(msg);
        }

        if !self.ready {
            outputs.iter_mut().for_each(|b| silence(Some(b)));
            return;
        }

        let value = self.current;
        let prev = self.previous;
        self.previous = value;

        match self.mode.pedal_source() {
            None => {
                for ch in 0..CHANNELS {
                    if let Some(out) = outputs.get_mut(ch) {
                        self.curve.render(out, value[ch], prev[ch], 1.0);
                    }
                }
                silence(outputs.get_mut(CHANNELS));
            }
            Some(src) => {
                for ch in 0..CHANNELS {
                    silence(outputs.get_mut(ch));
                }
                if let Some(out) = outputs.get_mut(CHANNELS) {
                    self.curve.render(out, value[src], prev[src], self.pedal_gain);
                }
            }
        }
    }

    fn buffer_size_changed(&mut self, ctx: &ProcessContext) {
        self.curve.set_block_size(ctx.buffer_size);
        if let Some(cadence) = &self.cadence {
            cadence.update(ctx);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { CHANNELS + 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 128;

    fn ctx() -> ProcessContext {
        ProcessContext::new(48_000, N)
    }

    fn run(node: &mut CvCapture, msgs: Vec<CaptureMessage>) -> Vec<Buffer> {
        let mut outputs = vec![vec![9.0; N]; 3];
        node.process(&ctx(), msgs.into_iter(), &[], &mut outputs);
        outputs
    }

    fn is_silent(b: &[f32]) -> bool {
        b.iter().all(|&s| s == 0.0)
    }

    #[test]
    fn silent_until_primed() {
        let mut node = CvCapture::new(false);

        // stale samples and modes do not make it ready
        let out = run(
            &mut node,
            vec![
                CaptureMessage::Sample { channel: 0, value: 7.0 },
                CaptureMessage::SetMode(PedalMode::Port1),
            ],
        );
        assert!(!node.is_ready());
        assert!(out.iter().all(|b| is_silent(b)));
    }

    #[test]
    fn primed_block_is_flat() {
        let mut node = CvCapture::new(false);
        let out = run(&mut node, vec![CaptureMessage::Prime([3.0, 6.0])]);

        assert!(out[0].iter().all(|&s| s == 3.0));
        assert!(out[1].iter().all(|&s| s == 6.0));
        assert!(is_silent(&out[2]));
    }

    #[test]
    fn new_reading_ramps_from_previous_block() {
        let mut node = CvCapture::new(false);
        run(&mut node, vec![CaptureMessage::Prime([0.0, 10.0])]);

        let out = run(
            &mut node,
            vec![
                CaptureMessage::Sample { channel: 0, value: 10.0 },
                CaptureMessage::Sample { channel: 1, value: 0.0 },
            ],
        );
        assert_eq!(out[0][0], 0.0);
        assert_eq!(out[0][N - 1], 10.0);
        assert_eq!(out[1][0], 10.0);
        assert_eq!(out[1][N - 1], 0.0);
        assert_eq!(node.previous(), [10.0, 0.0]);

        // previous moved exactly once: without new readings the next block is flat
        let out = run(&mut node, vec![]);
        assert!(out[0].iter().all(|&s| s == 10.0));
        assert!(out[1].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn pedal_mode_routes_selected_channel_at_half_scale() {
        let mut node = CvCapture::new(false);
        let out = run(
            &mut node,
            vec![
                CaptureMessage::Prime([4.0, 8.0]),
                CaptureMessage::SetMode(PedalMode::Port2),
            ],
        );

        assert!(is_silent(&out[0]));
        assert!(is_silent(&out[1]));
        assert!(out[2].iter().all(|&s| s == 4.0));
    }

    #[test]
    fn prescaled_pedal_is_not_attenuated() {
        let mut node = CvCapture::new(true);
        let out = run(
            &mut node,
            vec![
                CaptureMessage::Prime([4.0, 8.0]),
                CaptureMessage::SetMode(PedalMode::Port1),
            ],
        );
        assert!(out[2].iter().all(|&s| s == 4.0));
    }

    #[test]
    fn pedal_mode_still_advances_both_channels() {
        let mut node = CvCapture::new(false);
        run(
            &mut node,
            vec![
                CaptureMessage::Prime([1.0, 1.0]),
                CaptureMessage::SetMode(PedalMode::Port1),
            ],
        );
        run(&mut node, vec![CaptureMessage::Sample { channel: 1, value: 5.0 }]);

        // back to CV mode: channel 2 does not replay its old ramp
        let out = run(&mut node, vec![CaptureMessage::SetMode(PedalMode::Unused)]);
        assert!(out[1].iter().all(|&s| s == 5.0));
    }

    #[test]
    fn out_of_range_channel_is_ignored() {
        let mut node = CvCapture::new(false);
        run(
            &mut node,
            vec![
                CaptureMessage::Prime([1.0, 2.0]),
                CaptureMessage::Sample { channel: 5, value: 9.0 },
            ],
        );
        assert_eq!(node.current(), [1.0, 2.0]);
    }

    #[test]
    fn block_size_change_reaches_cadence() {
        let cadence = Arc::new(Cadence::new(&ctx()));
        let mut node = CvCapture::new(false).with_cadence(cadence.clone());

        node.buffer_size_changed(&ProcessContext::new(48_000, 480));
        assert_eq!(cadence.interval(), std::time::Duration::from_millis(10));
    }
}
