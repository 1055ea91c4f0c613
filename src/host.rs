//! Glue between an audio host and a node: message queue plus buffers.

use core::marker::PhantomData;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{AudioNode, Buffer, ProcessContext};

/// Sending side of a node's message queue.
///
/// Held by a worker thread. Sending is lock-free and never blocks.
pub struct Handle<M: Send + 'static> {
    pub(crate) sender: Producer<M>,
    pub(crate) _marker: PhantomData<M>,
}

impl<M: Send + 'static> Handle<M> {
    /// Queue a message for the next block.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the message was queued
    /// - `Err(msg)` if the queue is full (the audio side is not draining it)
    pub fn send(&mut self, msg: M) -> Result<(), M> {
        self.sender.push(msg).map_err(|rtrb::PushError::Full(m)| m)
    }

    /// Whether the receiving [`NodeHost`] has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.sender.is_abandoned()
    }
}

/// Owns a node, the receiving end of its queue and its block buffers.
///
/// This is the object an audio callback drives: copy input frames into
/// [`inputs_mut`](Self::inputs_mut), call [`process`](Self::process), copy
/// frames out of [`outputs`](Self::outputs).
pub struct NodeHost<N: AudioNode> {
    node: N,
    receiver: Consumer<N::Message>,
    ctx: ProcessContext,
    inputs: Vec<Buffer>,
    outputs: Vec<Buffer>,
}

/// Wrap `node` for `ctx`, with room for `queue_size` pending messages.
pub fn attach<N: AudioNode>(
    node: N,
    ctx: ProcessContext,
    queue_size: usize,
) -> (NodeHost<N>, Handle<N::Message>) {
    let (producer, consumer) = RingBuffer::new(queue_size.max(1));

    let mut host = NodeHost {
        inputs: Vec::with_capacity(node.num_inputs()),
        outputs: Vec::with_capacity(node.num_outputs()),
        node,
        receiver: consumer,
        ctx,
    };
    host.buffer_size_changed(ctx.buffer_size);

    let handle = Handle {
        sender: producer,
        _marker: PhantomData,
    };

    (host, handle)
}

impl<N: AudioNode> NodeHost<N> {
    #[inline]
    pub fn context(&self) -> &ProcessContext {
        &self.ctx
    }

    #[inline]
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Handle a block-size change: reallocate buffers and tell the node.
    pub fn buffer_size_changed(&mut self, frames: usize) {
        self.ctx.buffer_size = frames;

        self.inputs.clear();
        self.inputs.resize_with(self.node.num_inputs(), || vec![0.0; frames]);
        self.outputs.clear();
        self.outputs.resize_with(self.node.num_outputs(), || vec![0.0; frames]);

        self.node.buffer_size_changed(&self.ctx);
    }

    /// Run one block over the host's buffers.
    pub fn process(&mut self) {
        // Split borrow to avoid conflict between receiver and node
        let receiver = &mut self.receiver;
        let node = &mut self.node;

        // Draining iterator straight off the consumer - no allocation
        let messages = core::iter::from_fn(|| receiver.pop().ok());
        node.process(&self.ctx, messages, &self.inputs, &mut self.outputs);
    }

    /// Input buffers, to be filled before [`process`](Self::process).
    #[inline]
    pub fn inputs_mut(&mut self) -> &mut [Buffer] {
        &mut self.inputs
    }

    /// Output buffers as left by the last [`process`](Self::process).
    #[inline]
    pub fn outputs(&self) -> &[Buffer] {
        &self.outputs
    }

    /// Deinterleave `data` into the inputs, process, and interleave the
    /// outputs back into `data`.
    ///
    /// `data` holds `channels` samples per frame. A block of a different size
    /// than announced triggers [`buffer_size_changed`](Self::buffer_size_changed)
    /// first. Device channels without a matching node output are zeroed.
    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        self.deinterleave(data, channels);
        self.process();

        for (frame, chunk) in data.chunks_exact_mut(channels).enumerate() {
            for (ch, sample) in chunk.iter_mut().enumerate() {
                *sample = self.outputs.get(ch).map_or(0.0, |out| out[frame]);
            }
        }
    }

    /// Like [`process_interleaved`](Self::process_interleaved) for hosts
    /// that only capture: the outputs stay in [`outputs`](Self::outputs).
    pub fn process_from_interleaved(&mut self, data: &[f32], channels: usize) {
        self.deinterleave(data, channels.max(1));
        self.process();
    }

    fn deinterleave(&mut self, data: &[f32], channels: usize) {
        let frames = data.len() / channels;
        if frames != self.ctx.buffer_size {
            self.buffer_size_changed(frames);
        }

        for (ch, input) in self.inputs.iter_mut().enumerate() {
            for (frame, sample) in input.iter_mut().enumerate() {
                *sample = if ch < channels { data[frame * channels + ch] } else { 0.0 };
            }
        }
    }
}
