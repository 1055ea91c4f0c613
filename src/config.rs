//! Runtime configuration.
//!
//! Defaults suit a 12-bit, 0-10V converter behind a 128-frame host. Every
//! field can be overridden with a `with_*` builder or from the environment:
//!
//! | variable               | field            |
//! |------------------------|------------------|
//! | `CVBRIDGE_DEVICE`      | `device`         |
//! | `CVBRIDGE_PRESCALED`   | `prescaled` (set = true) |
//! | `CVBRIDGE_BLOCK_SIZE`  | `block_size`     |
//! | `CVBRIDGE_LOG`         | `log_level`      |
//! | `CVBRIDGE_SWITCHES`    | `switches`       |
//!
//! Unparseable values are ignored and the default kept.
//!
//! `CVBRIDGE_SWITCHES` stands in for a mixer: a comma-separated list of
//! `name=on|off` entries, e.g.
//! `CV/Exp.Pedal Mode=on,Exp.Pedal Mode=off`.

use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

use crate::control::SwitchBank;
use crate::curve::TABLE_SIZE;
use crate::quantize::{Quantizer, DEFAULT_RAW_MAX, DEFAULT_V_MAX};
use crate::worker::writer::DEFAULT_TIMEOUT;

pub const ENV_DEVICE: &str = "CVBRIDGE_DEVICE";
pub const ENV_PRESCALED: &str = "CVBRIDGE_PRESCALED";
pub const ENV_BLOCK_SIZE: &str = "CVBRIDGE_BLOCK_SIZE";
pub const ENV_LOG: &str = "CVBRIDGE_LOG";
pub const ENV_SWITCHES: &str = "CVBRIDGE_SWITCHES";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// IIO device directory, e.g. `/sys/bus/iio/devices/iio:device0`
    pub device: Option<PathBuf>,
    /// Capture readings are already in the expression pedal's range
    pub prescaled: bool,
    /// Full-scale register value
    pub raw_max: u32,
    /// Full-scale voltage
    pub v_max: f32,
    /// Block size requested from the host
    pub block_size: usize,
    /// Pending messages per node queue
    pub queue_size: usize,
    /// Longest the playback writer waits before re-polling its switch
    pub writer_timeout: Duration,
    pub log_level: Level,
    /// Fixed control-surface switch states; empty means no surface
    pub switches: Vec<(String, bool)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: None,
            prescaled: false,
            raw_max: DEFAULT_RAW_MAX,
            v_max: DEFAULT_V_MAX,
            block_size: TABLE_SIZE,
            queue_size: 64,
            writer_timeout: DEFAULT_TIMEOUT,
            log_level: Level::INFO,
            switches: Vec::new(),
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `var` returns for each variable.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(device) = var(ENV_DEVICE).filter(|d| !d.is_empty()) {
            config.device = Some(PathBuf::from(device));
        }
        config.prescaled = var(ENV_PRESCALED).is_some();
        if let Some(size) = var(ENV_BLOCK_SIZE).and_then(|s| s.trim().parse().ok()) {
            config.block_size = size;
        }
        if let Some(level) = var(ENV_LOG).and_then(|s| s.trim().parse().ok()) {
            config.log_level = level;
        }
        if let Some(list) = var(ENV_SWITCHES) {
            config.switches = parse_switches(&list);
        }

        config
    }

    pub fn with_device(mut self, device: impl Into<PathBuf>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_prescaled(mut self, prescaled: bool) -> Self {
        self.prescaled = prescaled;
        self
    }

    /// Set the register and voltage full-scale values.
    pub fn with_range(mut self, raw_max: u32, v_max: f32) -> Self {
        self.raw_max = raw_max;
        self.v_max = v_max;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    pub fn with_writer_timeout(mut self, timeout: Duration) -> Self {
        self.writer_timeout = timeout;
        self
    }

    /// Set a fixed switch state.
    pub fn with_switch(mut self, name: impl Into<String>, on: bool) -> Self {
        self.switches.push((name.into(), on));
        self
    }

    pub fn quantizer(&self) -> Quantizer {
        Quantizer::new(self.raw_max, self.v_max)
    }

    /// A control surface holding the configured switches, if any were set.
    pub fn control_surface(&self) -> Option<SwitchBank> {
        if self.switches.is_empty() {
            return None;
        }
        Some(SwitchBank::new(
            self.switches.iter().map(|(name, on)| (name.as_str(), *on)),
        ))
    }
}

fn parse_switches(list: &str) -> Vec<(String, bool)> {
    list.split(',')
        .filter_map(|entry| {
            let (name, state) = entry.split_once('=')?;
            let on = match state.trim().to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => true,
                "off" | "false" | "0" => false,
                _ => return None,
            };
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_owned(), on))
        })
        .collect()
}
