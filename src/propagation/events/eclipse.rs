use nalgebra::{Unit, Vector3};

use super::{Action, EventDetector};
use crate::error::Result;
use crate::propagation::SpacecraftState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowCrossing {
    Entry,
    Exit,
}

/// Detects crossings of the cylindrical shadow cast by a spherical body at the
/// origin, lit from a fixed direction.
///
/// The sun direction is taken to be expressed in the frame of the states the
/// detector is evaluated on.
#[derive(Debug, Clone)]
pub struct EclipseDetector {
    sun_direction: Unit<Vector3<f64>>,
    occulting_radius: f64,
    crossing: ShadowCrossing,
    max_check: f64,
    threshold: f64,
    action: Action,
}

impl EclipseDetector {
    /// `g` increases through zero when the spacecraft enters the shadow.
    pub fn entry(sun_direction: Vector3<f64>, occulting_radius: f64) -> Self {
        Self::new(sun_direction, occulting_radius, ShadowCrossing::Entry)
    }

    /// `g` increases through zero when the spacecraft leaves the shadow.
    pub fn exit(sun_direction: Vector3<f64>, occulting_radius: f64) -> Self {
        Self::new(sun_direction, occulting_radius, ShadowCrossing::Exit)
    }

    fn new(sun_direction: Vector3<f64>, occulting_radius: f64, crossing: ShadowCrossing) -> Self {
        EclipseDetector {
            sun_direction: Unit::new_normalize(sun_direction),
            occulting_radius,
            crossing,
            max_check: super::DEFAULT_MAX_CHECK,
            threshold: super::DEFAULT_THRESHOLD,
            action: Action::Continue,
        }
    }

    pub fn with_max_check(self, max_check: f64) -> Self {
        EclipseDetector { max_check, ..self }
    }

    pub fn with_threshold(self, threshold: f64) -> Self {
        EclipseDetector { threshold, ..self }
    }

    pub fn with_action(self, action: Action) -> Self {
        EclipseDetector { action, ..self }
    }

    pub fn crossing(&self) -> ShadowCrossing {
        self.crossing
    }

    /// Positive inside the shadow, negative in sunlight. Continuous everywhere,
    /// including across the terminator plane.
    pub fn shadow_depth(&self, position: &Vector3<f64>) -> f64 {
        let along = self.sun_direction.dot(position);
        if along < 0.0 {
            let off_axis = (position - along * self.sun_direction.into_inner()).norm();
            self.occulting_radius - off_axis
        } else {
            self.occulting_radius - position.norm()
        }
    }

    pub fn is_in_shadow(&self, state: &SpacecraftState) -> bool {
        self.shadow_depth(&state.pv().position) > 0.0
    }
}

impl EventDetector for EclipseDetector {
    fn g(&self, state: &SpacecraftState) -> Result<f64> {
        let depth = self.shadow_depth(&state.pv().position);
        Ok(match self.crossing {
            ShadowCrossing::Entry => depth,
            ShadowCrossing::Exit => -depth,
        })
    }

    fn max_check_interval(&self) -> f64 {
        self.max_check
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn event_occurred(&self, _state: &SpacecraftState, _increasing: bool) -> Result<Action> {
        Ok(self.action)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_shadow_depth() {
        let detector = EclipseDetector::entry(Vector3::new(2.0, 0.0, 0.0), 1.0);

        // Day side: distance from the body
        assert_relative_eq!(detector.shadow_depth(&Vector3::new(3.0, 0.0, 0.0)), -2.0);
        // Night side: distance from the shadow axis
        assert_relative_eq!(detector.shadow_depth(&Vector3::new(-3.0, 0.5, 0.0)), 0.5);
        assert_relative_eq!(detector.shadow_depth(&Vector3::new(-3.0, 0.0, 4.0)), -3.0);
        // Both branches agree on the terminator plane
        let on_plane = Vector3::new(0.0, 2.0, 0.0);
        let nudged = Vector3::new(-1e-9, 2.0, 0.0);
        assert_relative_eq!(
            detector.shadow_depth(&on_plane),
            detector.shadow_depth(&nudged),
            epsilon = 1e-8
        );
    }
}
