//! Control-surface switches that select how the CV ports are used.
//!
//! The surface is usually a mixer exposed by the sound card driver. Workers
//! poll it once per cycle; nothing here is touched by the audio thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;

/// Enables routing a capture channel to the expression pedal output.
pub const CV_EXP_MODE: &str = "CV/Exp.Pedal Mode";

/// Picks which capture channel feeds the expression pedal output
/// (off = port 1, on = port 2).
pub const EXP_PEDAL_MODE: &str = "Exp.Pedal Mode";

/// Turns the headphone jack into a pair of CV outputs.
pub const HP_CV_MODE: &str = "Headphone/CV Mode";

/// A source of named boolean switches.
pub trait ControlSurface: Send + 'static {
    /// Pick up pending changes. Called once per poll cycle before any
    /// [`switch`](Self::switch) lookups.
    fn refresh(&mut self) {}

    /// Current state of the named switch, or `None` if the surface has no
    /// such control.
    fn switch(&self, name: &str) -> Option<bool>;
}

impl<C: ControlSurface + ?Sized> ControlSurface for Box<C> {
    fn refresh(&mut self) {
        (**self).refresh()
    }

    fn switch(&self, name: &str) -> Option<bool> {
        (**self).switch(name)
    }
}

/// An in-memory control surface.
///
/// Cloning yields another view of the same switches, so one clone can be
/// handed to a worker while another flips switches from elsewhere.
#[derive(Clone, Debug, Default)]
pub struct SwitchBank {
    switches: Arc<HashMap<String, AtomicBool>>,
}

impl SwitchBank {
    /// Create a bank with the given switches and initial states.
    pub fn new<'a>(switches: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let switches = switches
            .into_iter()
            .map(|(name, on)| (name.to_owned(), AtomicBool::new(on)))
            .collect();

        Self {
            switches: Arc::new(switches),
        }
    }

    /// Bank with both capture switches, in the given states.
    pub fn capture(enable: bool, select: bool) -> Self {
        Self::new([(CV_EXP_MODE, enable), (EXP_PEDAL_MODE, select)])
    }

    /// Bank with the playback switch, in the given state.
    pub fn playback(enabled: bool) -> Self {
        Self::new([(HP_CV_MODE, enabled)])
    }

    /// Flip a switch. Returns `false` if the bank has no such switch.
    pub fn set(&self, name: &str, on: bool) -> bool {
        match self.switches.get(name) {
            Some(switch) => {
                switch.store(on, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }
}

impl ControlSurface for SwitchBank {
    fn switch(&self, name: &str) -> Option<bool> {
        self.switches.get(name).map(|s| s.load(Ordering::Relaxed))
    }
}
