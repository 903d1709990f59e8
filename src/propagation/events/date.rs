use super::{Action, EventDetector};
use crate::astro::{Epoch, TimeStamped};
use crate::error::Result;
use crate::propagation::SpacecraftState;

/// Fires when the propagation reaches a fixed date.
#[derive(Debug, Clone)]
pub struct DateDetector {
    target: Epoch,
    threshold: f64,
    action: Action,
}

impl DateDetector {
    pub fn new(target: Epoch) -> Self {
        DateDetector {
            target,
            threshold: super::DEFAULT_THRESHOLD,
            action: Action::Stop,
        }
    }

    pub fn with_action(self, action: Action) -> Self {
        DateDetector { action, ..self }
    }

    pub fn with_threshold(self, threshold: f64) -> Self {
        DateDetector { threshold, ..self }
    }

    pub fn target(&self) -> Epoch {
        self.target
    }
}

impl EventDetector for DateDetector {
    fn g(&self, state: &SpacecraftState) -> Result<f64> {
        Ok(state.date() - self.target)
    }

    // g is linear in time, so there is nothing to miss between checks
    fn max_check_interval(&self) -> f64 {
        1.0e10
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn event_occurred(&self, _state: &SpacecraftState, _increasing: bool) -> Result<Action> {
        Ok(self.action)
    }
}
