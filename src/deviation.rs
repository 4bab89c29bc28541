//! Compares the real listener against a reference position, usually a
//! simulated companion walking the planned route.
//!
//! Both flags are level-triggered: each fix recomputes them from the current
//! distance. Only flips are reported as [DeviationEvent]s, so the audio side
//! starts and stops cues on change rather than on every fix.

use crate::geometry::{distance, Coordinate, Meters};
use log::{debug, info};

/// Current watchdog state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviationState {
    pub reference_position: Option<Coordinate>,
    pub paused: bool,
    pub warning: bool,
}

/// A flip of one of the watchdog flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviationEvent {
    /// Stop advancing the reference, the listener fell behind.
    PauseReference,
    /// The listener caught up, let the reference move again.
    ResumeReference,
    /// The listener strayed past the warning threshold.
    WarningOn,
    /// The listener is back within the warning threshold.
    WarningOff,
}

#[derive(Debug, Clone)]
pub struct DeviationWatchdog {
    pause_threshold: Meters,
    warn_threshold: Meters,
    state: DeviationState,
}

impl DeviationWatchdog {
    pub fn new(pause_threshold: Meters, warn_threshold: Meters) -> Self {
        Self {
            pause_threshold,
            warn_threshold,
            state: DeviationState::default(),
        }
    }

    pub fn state(&self) -> DeviationState {
        self.state
    }

    /// Without a reference the watchdog never reports anything.
    pub fn is_inert(&self) -> bool {
        self.state.reference_position.is_none()
    }

    pub fn set_reference(&mut self, reference: Coordinate) {
        self.state.reference_position = Some(reference);
    }

    /// Drops the reference and lowers both flags without reporting flips.
    pub fn clear(&mut self) {
        self.state = DeviationState::default();
    }

    /// Re-evaluates both flags against `real`. The distance is computed once
    /// and shared by both checks. Pause flips are reported before warning
    /// flips.
    pub fn evaluate(&mut self, real: &Coordinate) -> Vec<DeviationEvent> {
        let Some(reference) = self.state.reference_position else {
            return Vec::new();
        };

        let gap = distance(real, &reference);
        let paused = gap > self.pause_threshold;
        let warning = gap > self.warn_threshold;
        debug!("deviation {:.1} m (paused={}, warning={})", gap, paused, warning);

        let mut events = Vec::new();
        if paused != self.state.paused {
            info!("reference {} at {:.1} m", if paused { "paused" } else { "resumed" }, gap);
            events.push(if paused {
                DeviationEvent::PauseReference
            } else {
                DeviationEvent::ResumeReference
            });
        }
        if warning != self.state.warning {
            info!("deviation warning {} at {:.1} m", if warning { "on" } else { "off" }, gap);
            events.push(if warning {
                DeviationEvent::WarningOn
            } else {
                DeviationEvent::WarningOff
            });
        }

        self.state.paused = paused;
        self.state.warning = warning;
        events
    }
}
