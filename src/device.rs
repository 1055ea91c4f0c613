//! CPAL device discovery and stream creation.
//!
//! Capture CV leaves the process through an output device; playback CV
//! arrives through an input device.
//!
//! # Example: List Devices
//!
//! ```no_run
//! use cvbridge::CpalDevice;
//!
//! for device in CpalDevice::list_outputs() {
//!     println!("{} ({} Hz, {} ch)", device.name(), device.sample_rate(), device.channels());
//! }
//! ```

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{BufferSize, SampleFormat, StreamConfig, SupportedStreamConfig};
use tracing::{error, info};

use crate::error::SetupError;
use crate::host::NodeHost;
use crate::node::{AudioNode, ProcessContext};

/// A discovered audio device.
pub struct CpalDevice {
    device: cpal::Device,
    config: SupportedStreamConfig,

    name: String,
    sample_rate: u32,
    channels: u16,
}

impl CpalDevice {
    fn describe(device: cpal::Device, config: SupportedStreamConfig) -> Self {
        let name = device.name().unwrap_or_else(|_| "Unknown".into());
        Self {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            name,
            device,
            config,
        }
    }

    /// The system's default output device, for capture pipelines.
    pub fn default_output() -> Result<Self, SetupError> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or(SetupError::NoAudioDevice("output"))?;
        let config = device.default_output_config()?;
        Ok(Self::describe(device, config))
    }

    /// The system's default input device, for playback pipelines.
    pub fn default_input() -> Result<Self, SetupError> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or(SetupError::NoAudioDevice("input"))?;
        let config = device.default_input_config()?;
        Ok(Self::describe(device, config))
    }

    /// All output devices. Empty if enumeration fails.
    pub fn list_outputs() -> Vec<Self> {
        cpal::default_host()
            .output_devices()
            .map(|devices| {
                devices
                    .filter_map(|device| {
                        let config = device.default_output_config().ok()?;
                        Some(Self::describe(device, config))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All input devices. Empty if enumeration fails.
    pub fn list_inputs() -> Vec<Self> {
        cpal::default_host()
            .input_devices()
            .map(|devices| {
                devices
                    .filter_map(|device| {
                        let config = device.default_input_config().ok()?;
                        Some(Self::describe(device, config))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Processing context for blocks of `block_size` frames on this device.
    pub fn context(&self, block_size: usize) -> ProcessContext {
        ProcessContext::new(self.sample_rate, block_size)
    }

    /// Drive `host` from this device's output callback.
    ///
    /// Node output `n` goes to device channel `n`; extra device channels are
    /// silent. The stream is built but not started.
    pub fn build_output_stream<N: AudioNode>(
        &self,
        mut host: NodeHost<N>,
    ) -> Result<cpal::Stream, SetupError> {
        self.check_format()?;
        let channels = self.channels as usize;
        let block_size = host.context().buffer_size;

        // The host adapts if the backend does not honour the fixed size.
        let config = self.stream_config(BufferSize::Fixed(block_size as u32));
        let stream = self.device.build_output_stream(
            &config,
            move |data: &mut [f32], _| host.process_interleaved(data, channels),
            |err| error!(%err, "output stream error"),
            None,
        )?;

        info!(device = %self.name, channels, block_size, "output stream ready");
        Ok(stream)
    }

    /// Drive `host` from this device's input callback.
    ///
    /// Device channel `n` feeds node input `n`; missing channels read as
    /// silence. The stream is built but not started.
    pub fn build_input_stream<N: AudioNode>(
        &self,
        mut host: NodeHost<N>,
    ) -> Result<cpal::Stream, SetupError> {
        self.check_format()?;
        let channels = self.channels as usize;
        let block_size = host.context().buffer_size;

        let config = self.stream_config(BufferSize::Fixed(block_size as u32));
        let stream = self.device.build_input_stream(
            &config,
            move |data: &[f32], _| host.process_from_interleaved(data, channels),
            |err| error!(%err, "input stream error"),
            None,
        )?;

        info!(device = %self.name, channels, block_size, "input stream ready");
        Ok(stream)
    }

    fn stream_config(&self, buffer_size: BufferSize) -> StreamConfig {
        StreamConfig {
            channels: self.channels,
            sample_rate: self.config.sample_rate(),
            buffer_size,
        }
    }

    fn check_format(&self) -> Result<(), SetupError> {
        match self.config.sample_format() {
            SampleFormat::F32 => Ok(()),
            other => {
                error!(device = %self.name, format = ?other, "only f32 streams are supported");
                Err(SetupError::BuildStream(cpal::BuildStreamError::StreamConfigNotSupported))
            }
        }
    }
}
