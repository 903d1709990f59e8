use std::cmp::Ordering;

use nalgebra::Vector3;
use tracing::{info, trace};

use super::events::{Action, EventDetector};
use super::{SpacecraftState, StateMapper};
use crate::astro::{Epoch, OrbitState, TimeShiftable, TimeStamped};
use crate::attitudes::AttitudeProvider;
use crate::error::{Error, Result};
use crate::math::intervals::Interval;
use crate::math::root_finding::bisection;

#[derive(Debug, Clone, Copy)]
pub struct PropagatorSettings {
    /// Longest step between two evaluations of the event functions, in
    /// seconds. Detectors asking for a shorter check interval get it.
    pub max_step: f64,
}

impl Default for PropagatorSettings {
    fn default() -> Self {
        PropagatorSettings { max_step: 300.0 }
    }
}

/// A sign change found within one step.
#[derive(Debug, Clone, Copy)]
struct EventCandidate {
    date: Epoch,
    index: usize,
    increasing: bool,
}

/// Callback for dense output at a fixed step; the flag marks the final state.
type StepHandler<'a> = (f64, &'a mut dyn FnMut(&SpacecraftState, bool));

/// Two-body propagator with event detection.
///
/// The orbit follows an exact Keplerian arc, so the propagator only has to step
/// in order to watch its event detectors. Every state it produces goes through
/// a [StateMapper] and gets its attitude from the propagator's own attitude
/// provider, which for an [AttitudesSequence](crate::attitudes::AttitudesSequence)
/// means the provider active at that moment.
pub struct KeplerianPropagator<A> {
    attitude: A,
    mapper: StateMapper,
    /// Orbit at the start of the next propagation
    reference: OrbitState,
    mass: f64,
    detectors: Vec<Box<dyn EventDetector>>,
    settings: PropagatorSettings,
}

impl<A: AttitudeProvider> KeplerianPropagator<A> {
    pub fn new(orbit: OrbitState, mass: f64, attitude: A) -> Self {
        let mapper = StateMapper::new(orbit.date(), orbit.frame().clone(), orbit.mu());
        KeplerianPropagator {
            attitude,
            mapper,
            reference: orbit,
            mass,
            detectors: Vec::new(),
            settings: PropagatorSettings::default(),
        }
    }

    pub fn with_settings(self, settings: PropagatorSettings) -> Self {
        KeplerianPropagator { settings, ..self }
    }

    /// Detectors are processed in the order they were added when their events
    /// fall on exactly the same date.
    pub fn add_event_detector(&mut self, detector: impl EventDetector + 'static) {
        self.detectors.push(Box::new(detector));
    }

    pub fn attitude_provider(&self) -> &A {
        &self.attitude
    }

    pub fn attitude_provider_mut(&mut self) -> &mut A {
        &mut self.attitude
    }

    pub fn current_date(&self) -> Epoch {
        self.reference.date()
    }

    pub fn current_state(&self) -> Result<SpacecraftState> {
        self.state_at(self.reference.date())
    }

    /// Propagates from the current date up to `target`, or to the first event
    /// whose detector asks to stop.
    pub fn propagate(&mut self, target: Epoch) -> Result<SpacecraftState> {
        self.run(target, None)
    }

    /// Same as [propagate](Self::propagate), also calling `handler` on the
    /// states at every multiple of `step` from the start, and on the final
    /// state.
    pub fn propagate_with_handler(
        &mut self,
        target: Epoch,
        step: f64,
        mut handler: impl FnMut(&SpacecraftState, bool),
    ) -> Result<SpacecraftState> {
        if !(step > 0.0) {
            return Err(Error::InvalidStep(step));
        }
        let handler: &mut dyn FnMut(&SpacecraftState, bool) = &mut handler;
        self.run(target, Some((step, handler)))
    }

    fn state_at(&self, date: Epoch) -> Result<SpacecraftState> {
        let orbit = self.reference.shifted_by(date - self.reference.date())?;
        let pv = orbit.pv();
        let y = [
            pv.position.x,
            pv.position.y,
            pv.position.z,
            pv.velocity.x,
            pv.velocity.y,
            pv.velocity.z,
            self.mass,
        ];
        let t = date - self.mapper.reference_date();
        self.mapper.map_array_to_state(t, &y, &self.attitude)
    }

    fn reset_reference(&mut self, state: &SpacecraftState) -> Result<()> {
        let (t, y) = self.mapper.map_state_to_array(state)?;
        self.reference = OrbitState::new(
            Vector3::new(y[0], y[1], y[2]),
            Vector3::new(y[3], y[4], y[5]),
            self.mapper.reference_date().shifted_by(t),
            self.mapper.frame().clone(),
            self.mapper.mu(),
        )?;
        self.mass = y[6];
        Ok(())
    }

    fn evaluate_g(&self, state: &SpacecraftState) -> Result<Vec<f64>> {
        self.detectors.iter().map(|d| d.g(state)).collect()
    }

    /// Finds every detector whose `g` changed sign between the two dates, and
    /// narrows each crossing down to the detector's threshold. Results are in
    /// chronological order.
    fn locate_events(
        &self,
        start: Epoch,
        g_start: &[f64],
        end: Epoch,
        g_end: &[f64],
    ) -> Result<Vec<EventCandidate>> {
        let mut found = Vec::new();
        for (index, detector) in self.detectors.iter().enumerate() {
            if (g_start[index] < 0.0) == (g_end[index] < 0.0) {
                continue;
            }
            let bracket = bisection(
                |dt| detector.g(&self.state_at(start.shifted_by(dt))?),
                Interval::new(0.0, end - start),
                detector.threshold(),
                detector.max_iteration_count(),
            )?;
            found.push(EventCandidate {
                // The high end is already past the crossing, so the event won't
                // be seen again from there.
                date: start.shifted_by(bracket.hi()),
                index,
                increasing: g_end[index] >= 0.0,
            });
        }

        found.sort_by(|a, b| {
            a.date
                .partial_cmp(&b.date)
                .unwrap_or(Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });
        Ok(found)
    }

    fn run(&mut self, target: Epoch, mut handler: Option<StepHandler>) -> Result<SpacecraftState> {
        let start = self.reference.date();
        if target < start {
            return Err(Error::BackwardPropagation {
                current: start,
                target,
            });
        }
        let max_step = self
            .detectors
            .iter()
            .map(|d| d.max_check_interval())
            .fold(self.settings.max_step, f64::min);
        if !(max_step > 0.0) {
            return Err(Error::InvalidStep(max_step));
        }

        let mut t = start;
        let mut g_prev = self.evaluate_g(&self.state_at(t)?)?;

        let mut samples_done = 0_u32;
        let mut last_handled = None;
        if let Some((_, h)) = handler.as_mut() {
            h(&self.state_at(t)?, t == target);
            samples_done = 1;
            last_handled = Some(t);
        }

        'steps: while t < target {
            let mut t_next = earliest(t.shifted_by(max_step), target);
            let next_sample = handler
                .as_ref()
                .map(|(step, _)| start.shifted_by(*step * f64::from(samples_done)));
            if let Some(sample_date) = next_sample {
                t_next = earliest(t_next, sample_date);
            }
            trace!(from = %t, to = %t_next, "step");

            let g_next = self.evaluate_g(&self.state_at(t_next)?)?;
            for event in self.locate_events(t, &g_prev, t_next, &g_next)? {
                let event_state = self.state_at(event.date)?;
                let detector = &self.detectors[event.index];
                let action = detector.event_occurred(&event_state, event.increasing)?;
                info!(
                    date = %event.date,
                    detector = event.index,
                    increasing = event.increasing,
                    ?action,
                    "event"
                );

                match action {
                    Action::Continue => {}
                    Action::Stop => {
                        // Rebuilt so that it reflects whatever the event changed
                        let final_state = self.state_at(event.date)?;
                        self.reset_reference(&final_state)?;
                        if let Some((_, h)) = handler.as_mut() {
                            h(&final_state, true);
                        }
                        return Ok(final_state);
                    }
                    Action::ResetState => {
                        let new_state = detector.reset_state(&event_state)?;
                        self.reset_reference(&new_state)?;
                        t = event.date;
                        g_prev = self.evaluate_g(&self.state_at(t)?)?;
                        continue 'steps;
                    }
                }
            }

            t = t_next;
            g_prev = g_next;
            if let (Some(sample_date), Some((_, h))) = (next_sample, handler.as_mut()) {
                if t == sample_date {
                    h(&self.state_at(t)?, t == target);
                    samples_done += 1;
                    last_handled = Some(t);
                }
            }
        }

        let final_state = self.state_at(target)?;
        self.reset_reference(&final_state)?;
        if let Some((_, h)) = handler.as_mut() {
            if last_handled != Some(target) {
                h(&final_state, true);
            }
        }
        Ok(final_state)
    }
}

fn earliest(a: Epoch, b: Epoch) -> Epoch {
    if b < a {
        b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use approx::assert_relative_eq;

    use super::*;
    use crate::astro::Frame;
    use crate::attitudes::InertialProvider;
    use crate::consts::{get_circular_velocity, EARTH_MU};
    use crate::propagation::events::DateDetector;
    use crate::propagation::DEFAULT_MASS;

    fn propagator() -> KeplerianPropagator<InertialProvider> {
        let radius = 7.0e6;
        let orbit = OrbitState::new(
            Vector3::new(radius, 0.0, 0.0),
            Vector3::new(0.0, get_circular_velocity(radius, EARTH_MU), 0.0),
            Epoch::ORIGIN,
            Frame::inertial("EME2000"),
            EARTH_MU,
        )
        .unwrap();
        KeplerianPropagator::new(orbit, DEFAULT_MASS, InertialProvider::aligned())
    }

    /// Doubles the mass when it fires.
    struct Refuel {
        date: Epoch,
        calls: Rc<Cell<usize>>,
    }

    impl EventDetector for Refuel {
        fn g(&self, state: &SpacecraftState) -> Result<f64> {
            Ok(state.date() - self.date)
        }

        fn event_occurred(&self, _state: &SpacecraftState, _increasing: bool) -> Result<Action> {
            self.calls.set(self.calls.get() + 1);
            Ok(Action::ResetState)
        }

        fn reset_state(&self, old_state: &SpacecraftState) -> Result<SpacecraftState> {
            SpacecraftState::new(
                old_state.orbit().clone(),
                old_state.attitude().clone(),
                2.0 * old_state.mass(),
            )
        }
    }

    #[test]
    fn test_stop_at_date() {
        let mut propagator = propagator();
        propagator.add_event_detector(DateDetector::new(Epoch::from_seconds(1234.5)));

        let state = propagator.propagate(Epoch::from_seconds(5000.0)).unwrap();
        assert_relative_eq!(state.date().seconds(), 1234.5, epsilon = 1e-5);
        assert_eq!(propagator.current_date(), state.date());
    }

    #[test]
    fn test_reset_state_restarts_model() {
        let mut propagator = propagator();
        let calls = Rc::new(Cell::new(0));
        propagator.add_event_detector(Refuel {
            date: Epoch::from_seconds(100.0),
            calls: Rc::clone(&calls),
        });

        let state = propagator.propagate(Epoch::from_seconds(1000.0)).unwrap();
        assert_eq!(calls.get(), 1);
        assert_relative_eq!(state.mass(), 2.0 * DEFAULT_MASS);
        assert_eq!(state.date(), Epoch::from_seconds(1000.0));

        // The orbit is untouched by the reset
        let reference = self::propagator().propagate(Epoch::from_seconds(1000.0)).unwrap();
        assert_relative_eq!(state.pv().position, reference.pv().position, epsilon = 1e-2);
    }

    #[test]
    fn test_fixed_step_handler() {
        let mut propagator = propagator();
        let mut dates = Vec::new();
        let mut last_flags = Vec::new();
        propagator
            .propagate_with_handler(Epoch::from_seconds(250.0), 100.0, |state, is_last| {
                dates.push(state.date().seconds());
                last_flags.push(is_last);
            })
            .unwrap();

        assert_eq!(dates, vec![0.0, 100.0, 200.0, 250.0]);
        assert_eq!(last_flags, vec![false, false, false, true]);
    }

    #[test]
    fn test_rejects_bad_requests() {
        let mut propagator = propagator();
        propagator.propagate(Epoch::from_seconds(10.0)).unwrap();

        assert!(matches!(
            propagator.propagate(Epoch::ORIGIN),
            Err(Error::BackwardPropagation { .. })
        ));
        assert!(matches!(
            propagator.propagate_with_handler(Epoch::from_seconds(20.0), 0.0, |_, _| {}),
            Err(Error::InvalidStep(_))
        ));
    }
}
