//! Event detection: scalar switching functions whose sign changes mark the
//! moments a propagator has to stop at.

mod date;
mod eclipse;

use std::rc::Rc;

use super::SpacecraftState;
use crate::error::Result;

pub use date::DateDetector;
pub use eclipse::{EclipseDetector, ShadowCrossing};

pub const DEFAULT_MAX_CHECK: f64 = 600.0;
pub const DEFAULT_THRESHOLD: f64 = 1.0e-6;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// What the propagator should do once an event has been located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Stop,
    /// Replace the current state with the one returned by
    /// [EventDetector::reset_state], then carry on.
    ResetState,
}

pub trait EventDetector {
    /// Switching function. Events happen where it changes sign.
    fn g(&self, state: &SpacecraftState) -> Result<f64>;

    /// Largest step the propagator may take without evaluating `g`. Two sign
    /// changes closer together than this may be missed.
    fn max_check_interval(&self) -> f64 {
        DEFAULT_MAX_CHECK
    }

    /// Convergence threshold on the event date, in seconds.
    fn threshold(&self) -> f64 {
        DEFAULT_THRESHOLD
    }

    fn max_iteration_count(&self) -> usize {
        DEFAULT_MAX_ITERATIONS
    }

    /// Called once per located event. `increasing` tells which way `g` crossed
    /// zero.
    fn event_occurred(&self, state: &SpacecraftState, increasing: bool) -> Result<Action>;

    fn reset_state(&self, old_state: &SpacecraftState) -> Result<SpacecraftState> {
        Ok(old_state.clone())
    }
}

macro_rules! forward_event_detector {
    ($ptr:ident) => {
        impl<T: EventDetector + ?Sized> EventDetector for $ptr<T> {
            fn g(&self, state: &SpacecraftState) -> Result<f64> {
                (**self).g(state)
            }

            fn max_check_interval(&self) -> f64 {
                (**self).max_check_interval()
            }

            fn threshold(&self) -> f64 {
                (**self).threshold()
            }

            fn max_iteration_count(&self) -> usize {
                (**self).max_iteration_count()
            }

            fn event_occurred(&self, state: &SpacecraftState, increasing: bool) -> Result<Action> {
                (**self).event_occurred(state, increasing)
            }

            fn reset_state(&self, old_state: &SpacecraftState) -> Result<SpacecraftState> {
                (**self).reset_state(old_state)
            }
        }
    };
}

forward_event_detector!(Box);
forward_event_detector!(Rc);
