//! Audio-rate CV reduced to one value per block for the playback registers

use crossbeam_channel::{Sender, TrySendError};

use crate::mode::PlaybackMode;
use crate::node::{AudioNode, Buffer, ProcessContext};
use crate::reduce::Reducer;

/// Channels per playback device.
pub const CHANNELS: usize = 2;

/// Messages from the writer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackMessage {
    SetMode(PlaybackMode),
}

/// One block's worth of output, handed to the writer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reduced {
    pub values: [f32; CHANNELS],
}

/// Collapses the `playback_1` and `playback_2` inputs to one value each per
/// block and hands the pair to the writer thread.
///
/// The handoff never blocks: when the writer is behind and the channel is
/// full the block's pair is dropped and the writer catches up with a later
/// one.
pub struct CvPlayback {
    mode: PlaybackMode,
    reducer: Reducer,
    handoff: Sender<Reduced>,
    last: Reduced,
    dropped: u64,
}

impl CvPlayback {
    pub fn new(handoff: Sender<Reduced>) -> Self {
        Self {
            mode: PlaybackMode::Enabled,
            reducer: Reducer::default(),
            handoff,
            last: Reduced::default(),
            dropped: 0,
        }
    }

    #[inline]
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Values produced by the last block.
    #[inline]
    pub fn last(&self) -> Reduced {
        self.last
    }

    /// Blocks whose values never reached the writer.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl AudioNode for CvPlayback {
    type Message = PlaybackMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = PlaybackMessage>,
        inputs: &[Buffer],
        _outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                PlaybackMessage::SetMode(mode) => self.mode = mode,
            }
        }

        let mut reduced = Reduced::default();
        if self.mode.is_enabled() {
            for (value, input) in reduced.values.iter_mut().zip(inputs.iter()) {
                *value = self.reducer.reduce(input);
            }
        }
        self.last = reduced;

        match self.handoff.try_send(reduced) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => self.dropped += 1,
        }
    }

    fn buffer_size_changed(&mut self, ctx: &ProcessContext) {
        self.reducer.set_block_size(ctx.buffer_size);
    }

    #[inline]
    fn num_inputs(&self) -> usize { CHANNELS }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
