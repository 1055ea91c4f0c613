//! Audio sink nodes (no audio outputs)

pub mod cv_playback;

pub use cv_playback::{CvPlayback, PlaybackMessage, Reduced};
