//! The two audio-side nodes.
//!
//! ## Sources ([`source`])
//!
//! - [`CvCapture`] - Renders the capture registers as audio-rate CV
//!
//! ## Sinks ([`sink`])
//!
//! - [`CvPlayback`] - Reduces audio-rate CV to values for the playback registers
//!
//! Port names and the metadata a host may publish for them are listed in
//! [`CAPTURE_PORTS`] and [`PLAYBACK_PORTS`].

pub mod source;
pub mod sink;

pub use source::{CaptureMessage, CvCapture};
pub use sink::{CvPlayback, PlaybackMessage, Reduced};

/// Description of one audio port, for hosts that publish port metadata.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortInfo {
    /// Short port name
    pub name: &'static str,
    /// Human-readable name, also used as the port alias
    pub pretty_name: &'static str,
    /// Signal type tag
    pub signal_type: &'static str,
    /// Position among the client's ports, starting at 1
    pub order: u8,
    /// Lowest value the port carries
    pub minimum: f32,
    /// Highest value the port carries
    pub maximum: f32,
}

/// Outputs of [`CvCapture`], in buffer order.
pub const CAPTURE_PORTS: [PortInfo; 3] = [
    PortInfo {
        name: "capture_1",
        pretty_name: "CV Capture 1",
        signal_type: "CV",
        order: 1,
        minimum: 0.0,
        maximum: 10.0,
    },
    PortInfo {
        name: "capture_2",
        pretty_name: "CV Capture 2",
        signal_type: "CV",
        order: 2,
        minimum: 0.0,
        maximum: 10.0,
    },
    PortInfo {
        name: "exp_pedal",
        pretty_name: "Expression Pedal",
        signal_type: "CV",
        order: 3,
        minimum: 0.0,
        maximum: 5.0,
    },
];

/// Inputs of [`CvPlayback`], in buffer order.
pub const PLAYBACK_PORTS: [PortInfo; 2] = [
    PortInfo {
        name: "playback_1",
        pretty_name: "CV Playback 1",
        signal_type: "CV",
        order: 1,
        minimum: 0.0,
        maximum: 10.0,
    },
    PortInfo {
        name: "playback_2",
        pretty_name: "CV Playback 2",
        signal_type: "CV",
        order: 2,
        minimum: 0.0,
        maximum: 10.0,
    },
];
