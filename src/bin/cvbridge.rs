//! Bridge one direction of an IIO converter to the default audio device.
//!
//! ```text
//! cvbridge capture  [iio-device-dir]   # ADC -> default output device
//! cvbridge playback [iio-device-dir]   # default input device -> DAC
//! ```
//!
//! The device directory falls back to `CVBRIDGE_DEVICE`. Press enter to stop.
//!
//! There is no mixer attachment; routing switches are fixed for the session
//! through `CVBRIDGE_SWITCHES` (see [`cvbridge::config`]). Without it the
//! pedal port stays unused and playback stays enabled.

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use cpal::traits::StreamTrait;
use tracing::info;

use cvbridge::{CapturePipeline, Config, CpalDevice, PlaybackPipeline};

const USAGE: &str = "usage: cvbridge <capture|playback> [iio-device-dir]";

fn wait_for_enter() {
    let mut line = String::new();
    // EOF or an error on stdin ends the session just the same
    let _ = std::io::stdin().lock().read_line(&mut line);
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let direction = args.next().context(USAGE)?;

    let mut config = Config::from_env();
    if let Some(dir) = args.next() {
        config = config.with_device(dir);
    }

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    match direction.as_str() {
        "capture" => {
            let device = CpalDevice::default_output()?;
            let ctx = device.context(config.block_size);
            let (pipeline, host) = CapturePipeline::open(&config, config.control_surface(), ctx)
                .context("starting capture pipeline")?;

            let stream = device.build_output_stream(host)?;
            stream.play().context("starting output stream")?;
            info!(device = device.name(), "capturing, press enter to stop");

            wait_for_enter();
            drop(stream);
            pipeline.shutdown();
        }
        "playback" => {
            let device = CpalDevice::default_input()?;
            let ctx = device.context(config.block_size);
            let (pipeline, host) = PlaybackPipeline::open(&config, config.control_surface(), ctx)
                .context("starting playback pipeline")?;

            let stream = device.build_input_stream(host)?;
            stream.play().context("starting input stream")?;
            info!(device = device.name(), "playing back, press enter to stop");

            wait_for_enter();
            drop(stream);
            pipeline.shutdown();
        }
        other => bail!("unknown direction {:?}\n{}", other, USAGE),
    }

    Ok(())
}
