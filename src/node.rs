//! Core node trait and context types.

/// One channel of one audio block.
///
/// Hosts preallocate these; nodes fill or read them in place and never resize
/// them while processing.
pub type Buffer = Vec<f32>;

/// Information available during audio processing.
///
/// Passed to every [`AudioNode::process`] call and to
/// [`AudioNode::buffer_size_changed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessContext {
    /// Sample rate of the host in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Frames per block as last announced by the host
    pub buffer_size: usize,
}

impl ProcessContext {
    pub fn new(sample_rate: u32, buffer_size: usize) -> Self {
        Self {
            sample_rate,
            buffer_size,
        }
    }

    /// Wall-clock length of one block, in seconds.
    pub fn block_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.buffer_size as f64 / self.sample_rate as f64
    }
}

/// The core trait for nodes driven by the real-time audio callback.
///
/// # Message-Based Parameters
///
/// A node never shares mutable state with other threads. Workers send it
/// messages through a lock-free queue instead; the queue is drained right
/// before every block, so a node sees a consistent snapshot for the whole
/// block:
///
/// ```
/// use cvbridge::{AudioNode, Buffer, ProcessContext};
///
/// enum OffsetMessage {
///     Set(f32),
/// }
///
/// struct Offset {
///     value: f32,
/// }
///
/// impl AudioNode for Offset {
///     type Message = OffsetMessage;
///
///     fn process(
///         &mut self,
///         _ctx: &ProcessContext,
///         messages: impl Iterator<Item = OffsetMessage>,
///         _inputs: &[Buffer],
///         outputs: &mut [Buffer],
///     ) {
///         for msg in messages {
///             match msg {
///                 OffsetMessage::Set(v) => self.value = v,
///             }
///         }
///
///         for sample in outputs[0].iter_mut() {
///             *sample = self.value;
///         }
///     }
/// }
/// ```
///
/// # Real-time rules
///
/// `process` runs on the host's audio thread. It must not block, allocate or
/// log, and it has no way to fail: whatever happens, it fills its outputs.
pub trait AudioNode: Send + 'static {
    /// Message type for updates from worker threads.
    type Message: Send + 'static;

    /// Process one block.
    ///
    /// 1. Drain and handle all pending messages
    /// 2. Read from `inputs` (if any)
    /// 3. Write every frame of every buffer in `outputs`
    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = Self::Message>,
        inputs: &[Buffer],
        outputs: &mut [Buffer],
    );

    /// The host switched to a new block size.
    ///
    /// Called between blocks, never concurrently with `process`. Scratch
    /// storage is reallocated here and only here.
    fn buffer_size_changed(&mut self, _ctx: &ProcessContext) {}

    /// Number of audio input channels (0 for sources).
    fn num_inputs(&self) -> usize { 0 }

    /// Number of audio output channels (0 for sinks).
    fn num_outputs(&self) -> usize { 1 }
}
