//! Audio source nodes (no audio inputs)

pub mod cv_capture;

pub use cv_capture::{CaptureMessage, CvCapture};
