//! cvbridge - hardware control voltages as audio-rate signals, and back
//!
//! Design principles:
//! - The audio callback never touches hardware; worker threads do the
//!   blocking register I/O
//! - Workers talk to nodes through lock-free message queues, never shared
//!   mutable state
//! - A slow CV reading is rendered as a logarithmic ramp per block, so the
//!   signal has no steps
//! - Audio-rate CV is reduced to one spike-resistant value per block before
//!   it reaches the hardware
//!
//! Capture: `registers → Poller → CvCapture → capture_1, capture_2, exp_pedal`
//!
//! Playback: `playback_1, playback_2 → CvPlayback → Writer → registers`

mod error;
mod host;
mod node;
mod pipeline;

pub mod config;
pub mod control;
pub mod curve;
pub mod mode;
pub mod nodes;
pub mod quantize;
pub mod reduce;
pub mod register;
pub mod worker;

#[cfg(feature = "cpal_host")]
mod device;

pub use config::Config;
pub use control::{ControlSurface, SwitchBank};
pub use error::{RegisterError, SetupError};
pub use host::{attach, Handle, NodeHost};
pub use mode::{PedalMode, PlaybackMode};
pub use node::{AudioNode, Buffer, ProcessContext};
pub use pipeline::{CapturePipeline, PlaybackPipeline};
pub use quantize::Quantizer;
pub use register::{IioDevice, Register, SysfsRegister};
pub use worker::WorkerState;

#[cfg(feature = "cpal_host")]
pub use device::CpalDevice;
