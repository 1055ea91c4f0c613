//! Error types.
//!
//! Only setup can fail hard. Everything that goes wrong once a pipeline is
//! running is a [`RegisterError`], which the workers log and then ignore.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A failure that prevents a pipeline from starting.
///
/// When a constructor returns one of these nothing has been left running:
/// no worker thread, no open stream.
#[derive(Debug, Error)]
pub enum SetupError {
    /// No hardware device directory was given, neither as an argument nor via
    /// the environment.
    #[error("no hardware device selected (pass a device directory or set CVBRIDGE_DEVICE)")]
    NoDevice,

    /// A register or device attribute file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The device `name` attribute could not be read.
    #[error("cannot read device name from {}: {source}", path.display())]
    DeviceName {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The OS refused to create a worker thread.
    #[error("cannot spawn {name} worker: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    /// No usable audio device was found.
    #[cfg(feature = "cpal_host")]
    #[error("no audio {0} device available")]
    NoAudioDevice(&'static str),

    #[cfg(feature = "cpal_host")]
    #[error("cannot query audio device configuration: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[cfg(feature = "cpal_host")]
    #[error("cannot build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "cpal_host")]
    #[error("cannot start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// A single failed register access.
///
/// Transient by definition: the caller keeps its previous value and tries
/// again on the next cycle.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("register i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The register returned something that is not an integer.
    #[error("unparseable register content {0:?}")]
    Parse(String),
}
