//! Port routing modes derived from control-surface switches.

use crate::control::{ControlSurface, CV_EXP_MODE, EXP_PEDAL_MODE, HP_CV_MODE};

/// How the capture ports are used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PedalMode {
    /// Both CV ports carry their own channel; the pedal port is silent.
    #[default]
    Unused,
    /// Channel 1 drives the pedal port; both CV ports are silent.
    Port1,
    /// Channel 2 drives the pedal port; both CV ports are silent.
    Port2,
}

impl PedalMode {
    /// Apply the routing rule to the two switch readings.
    pub fn from_switches(enable: bool, select: bool) -> Self {
        match (enable, select) {
            (false, _) => PedalMode::Unused,
            (true, false) => PedalMode::Port1,
            (true, true) => PedalMode::Port2,
        }
    }

    /// Read the mode off a control surface.
    ///
    /// Returns `None` when either switch is missing; the caller keeps its
    /// default then.
    pub fn poll<C: ControlSurface + ?Sized>(surface: &C) -> Option<Self> {
        let enable = surface.switch(CV_EXP_MODE)?;
        let select = surface.switch(EXP_PEDAL_MODE)?;
        Some(Self::from_switches(enable, select))
    }

    /// Index of the capture channel routed to the pedal port, if any.
    #[inline]
    pub fn pedal_source(self) -> Option<usize> {
        match self {
            PedalMode::Unused => None,
            PedalMode::Port1 => Some(0),
            PedalMode::Port2 => Some(1),
        }
    }
}

/// Whether the playback direction drives the hardware at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaybackMode {
    #[default]
    Enabled,
    /// Hardware outputs are held at zero.
    Disabled,
}

impl PlaybackMode {
    pub fn from_switch(on: bool) -> Self {
        if on {
            PlaybackMode::Enabled
        } else {
            PlaybackMode::Disabled
        }
    }

    /// Read the mode off a control surface, `None` if the switch is missing.
    pub fn poll<C: ControlSurface + ?Sized>(surface: &C) -> Option<Self> {
        surface.switch(HP_CV_MODE).map(Self::from_switch)
    }

    #[inline]
    pub fn is_enabled(self) -> bool {
        self == PlaybackMode::Enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::SwitchBank;

    #[test]
    fn transition_table() {
        assert_eq!(PedalMode::from_switches(false, false), PedalMode::Unused);
        assert_eq!(PedalMode::from_switches(false, true), PedalMode::Unused);
        assert_eq!(PedalMode::from_switches(true, false), PedalMode::Port1);
        assert_eq!(PedalMode::from_switches(true, true), PedalMode::Port2);
    }

    #[test]
    fn poll_reads_both_switches() {
        let bank = SwitchBank::capture(true, true);
        assert_eq!(PedalMode::poll(&bank), Some(PedalMode::Port2));

        bank.set(CV_EXP_MODE, false);
        assert_eq!(PedalMode::poll(&bank), Some(PedalMode::Unused));
    }

    #[test]
    fn missing_switch_yields_no_mode() {
        let bank = SwitchBank::new([(CV_EXP_MODE, true)]);
        assert_eq!(PedalMode::poll(&bank), None);
        assert_eq!(PlaybackMode::poll(&bank), None);
    }

    #[test]
    fn pedal_source_follows_mode() {
        assert_eq!(PedalMode::Unused.pedal_source(), None);
        assert_eq!(PedalMode::Port1.pedal_source(), Some(0));
        assert_eq!(PedalMode::Port2.pedal_source(), Some(1));
    }

    #[test]
    fn playback_switch() {
        let bank = SwitchBank::playback(false);
        assert_eq!(PlaybackMode::poll(&bank), Some(PlaybackMode::Disabled));
        bank.set(HP_CV_MODE, true);
        assert!(PlaybackMode::poll(&bank).unwrap().is_enabled());
    }
}
