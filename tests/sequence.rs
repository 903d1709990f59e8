use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use approx::assert_relative_eq;
use itertools::Itertools;
use nalgebra::{UnitQuaternion, Vector3};

use rust_attitudes::astro::{Epoch, Frame, OrbitState, TimeStamped};
use rust_attitudes::attitudes::{AttitudesSequence, InertialProvider, ProviderID};
use rust_attitudes::consts::{get_circular_velocity, EARTH_EQUATORIAL_RADIUS, EARTH_MU};
use rust_attitudes::error::{Error, Result};
use rust_attitudes::propagation::events::{Action, DateDetector, EclipseDetector, EventDetector};
use rust_attitudes::propagation::{KeplerianPropagator, SpacecraftState, DEFAULT_MASS};

const RADIUS: f64 = 7.0e6;

fn circular_orbit() -> OrbitState {
    OrbitState::new(
        Vector3::new(RADIUS, 0.0, 0.0),
        Vector3::new(0.0, get_circular_velocity(RADIUS, EARTH_MU), 0.0),
        Epoch::ORIGIN,
        Frame::inertial("EME2000"),
        EARTH_MU,
    )
    .unwrap()
}

fn yawed(angle: f64) -> InertialProvider {
    InertialProvider::new(UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle))
}

/// Angle from the reference x axis to the body x axis, about z.
fn yaw(state: &SpacecraftState) -> f64 {
    let x = state.attitude().body_to_reference(&Vector3::x());
    x.y.atan2(x.x)
}

/// A detector with unusual settings everywhere, to check they are forwarded.
struct Peculiar;

impl EventDetector for Peculiar {
    fn g(&self, state: &SpacecraftState) -> Result<f64> {
        Ok(state.pv().position.x - 1.0e6)
    }

    fn max_check_interval(&self) -> f64 {
        42.0
    }

    fn threshold(&self) -> f64 {
        0.5
    }

    fn max_iteration_count(&self) -> usize {
        7
    }

    fn event_occurred(&self, _state: &SpacecraftState, _increasing: bool) -> Result<Action> {
        Ok(Action::ResetState)
    }

    fn reset_state(&self, old_state: &SpacecraftState) -> Result<SpacecraftState> {
        SpacecraftState::new(
            old_state.orbit().clone(),
            old_state.attitude().clone(),
            old_state.mass() - 1.0,
        )
    }
}

#[test]
fn test_switch_behaves_like_wrapped_detector() {
    let mut sequence = AttitudesSequence::new();
    let a = sequence.add_provider(yawed(0.0));
    let b = sequence.add_provider(yawed(1.0));
    sequence
        .add_switching_condition(a, Peculiar, true, true, b)
        .unwrap();

    let switches = sequence.expose_detectors();
    assert_eq!(switches.len(), 1);
    let switch = &switches[0];
    assert_eq!(switch.source(), a);
    assert_eq!(switch.next(), b);

    let state = SpacecraftState::from_orbit(circular_orbit()).unwrap();
    assert_eq!(switch.g(&state).unwrap(), Peculiar.g(&state).unwrap());
    assert_eq!(switch.max_check_interval(), 42.0);
    assert_eq!(switch.threshold(), 0.5);
    assert_eq!(switch.max_iteration_count(), 7);

    let reset = switch.reset_state(&state).unwrap();
    assert_eq!(reset.mass(), DEFAULT_MASS - 1.0);
    assert_eq!(reset.orbit(), state.orbit());

    assert_eq!(switch.event_occurred(&state, false).unwrap(), Action::ResetState);
    assert_eq!(sequence.active_provider(), Some(b));
}

#[test]
fn test_increasing_only_switch() {
    let mut sequence = AttitudesSequence::new();
    let a = sequence.add_provider(yawed(0.0));
    let b = sequence.add_provider(yawed(1.0));
    let detector = DateDetector::new(Epoch::from_seconds(10.0)).with_action(Action::Continue);
    sequence
        .add_switching_condition(a, detector, true, false, b)
        .unwrap();
    let switch = sequence.expose_detectors().remove(0);
    let state = SpacecraftState::from_orbit(circular_orbit()).unwrap();

    // The wrapped detector's answer is returned either way
    assert_eq!(switch.event_occurred(&state, false).unwrap(), Action::Continue);
    assert_eq!(sequence.active_provider(), Some(a));

    assert_eq!(switch.event_occurred(&state, true).unwrap(), Action::Continue);
    assert_eq!(sequence.active_provider(), Some(b));
    assert_eq!(switch.active_provider(), Some(b));

    // Resetting wins over the earlier switch
    sequence.reset_active_provider(a).unwrap();
    assert_eq!(sequence.active_provider(), Some(a));
}

#[test]
fn test_reset_keeps_provider_until_next_event() {
    let mut sequence = AttitudesSequence::new();
    let a = sequence.add_provider(yawed(0.0));
    let b = sequence.add_provider(yawed(1.0));
    let x = sequence.add_provider(yawed(2.0));
    sequence.reset_active_provider(x).unwrap();
    sequence
        .add_switching_condition(a, DateDetector::new(Epoch::from_seconds(50.0)), true, false, b)
        .unwrap();
    sequence.add_absorbing_provider(b).unwrap();
    assert_eq!(sequence.switching_condition_count(x), 0);

    let state = SpacecraftState::from_orbit(circular_orbit()).unwrap();
    for _ in 0..3 {
        let attitude = sequence
            .current_attitude(state.orbit(), state.date(), state.frame())
            .unwrap();
        assert_relative_eq!(
            attitude.body_to_reference(&Vector3::x()),
            Vector3::new(2.0_f64.cos(), 2.0_f64.sin(), 0.0),
            epsilon = 1e-14
        );
        assert_eq!(sequence.active_provider(), Some(x));
    }
}

#[test]
fn test_stop_reports_new_provider() {
    let mut sequence = AttitudesSequence::new();
    let a = sequence.add_provider(yawed(0.0));
    let b = sequence.add_provider(yawed(FRAC_PI_2));
    sequence
        .add_switching_condition(a, DateDetector::new(Epoch::from_seconds(50.0)), true, false, b)
        .unwrap();
    let switches = sequence.expose_detectors();

    let mut propagator = KeplerianPropagator::new(circular_orbit(), DEFAULT_MASS, sequence);
    for switch in switches {
        propagator.add_event_detector(switch);
    }

    let state = propagator.propagate(Epoch::from_seconds(1000.0)).unwrap();
    assert_relative_eq!(state.date().seconds(), 50.0, epsilon = 1e-5);
    assert_relative_eq!(yaw(&state), FRAC_PI_2, epsilon = 1e-12);
    assert_eq!(propagator.attitude_provider().active_provider(), Some(b));
}

#[test]
fn test_sunlit_eclipse_cycle() {
    let sun = Vector3::x();
    let entry = EclipseDetector::entry(sun, EARTH_EQUATORIAL_RADIUS);
    let exit = EclipseDetector::exit(sun, EARTH_EQUATORIAL_RADIUS);
    let shadow = entry.clone();

    let mut sequence = AttitudesSequence::new();
    let sunlit = sequence.add_provider(yawed(0.0));
    let eclipse = sequence.add_provider(yawed(FRAC_PI_2));
    sequence
        .add_switching_condition(sunlit, entry, true, false, eclipse)
        .unwrap();
    sequence
        .add_switching_condition(eclipse, exit, true, false, sunlit)
        .unwrap();
    assert_eq!(sequence.active_provider(), Some(sunlit));
    let switches = sequence.expose_detectors();

    let orbit = circular_orbit();
    let period = orbit.keplerian_period().unwrap();
    let mut propagator = KeplerianPropagator::new(orbit, DEFAULT_MASS, sequence);
    for switch in switches {
        propagator.add_event_detector(switch);
    }

    let mut samples = Vec::new();
    let final_state = propagator
        .propagate_with_handler(Epoch::from_seconds(2.0 * period), 60.0, |state, _| {
            let in_eclipse = yaw(state) > FRAC_PI_4;
            let depth = shadow.shadow_depth(&state.pv().position);
            samples.push((in_eclipse, depth));
        })
        .unwrap();

    // Away from the shadow boundary the attitude always matches the lighting
    for &(in_eclipse, depth) in &samples {
        if depth.abs() > 1.0e3 {
            assert_eq!(in_eclipse, depth > 0.0, "depth {}", depth);
        }
    }

    // Two eclipses: in and out twice
    let switches_seen = samples
        .iter()
        .tuple_windows()
        .filter(|(before, after)| before.0 != after.0)
        .count();
    assert_eq!(switches_seen, 4);

    assert_relative_eq!(yaw(&final_state), 0.0, epsilon = 1e-12);
    assert_eq!(propagator.attitude_provider().active_provider(), Some(sunlit));
}

#[test]
fn test_simultaneous_switches_pick_one_target() {
    let mut sequence = AttitudesSequence::new();
    let a = sequence.add_provider(yawed(0.0));
    let b = sequence.add_provider(yawed(1.0));
    let c = sequence.add_provider(yawed(2.0));
    let at = Epoch::from_seconds(100.0);
    for target in [b, c] {
        let detector = DateDetector::new(at).with_action(Action::Continue);
        sequence
            .add_switching_condition(a, detector, true, false, target)
            .unwrap();
    }
    assert_eq!(sequence.switching_condition_count(a), 2);

    let switches = sequence.expose_detectors();
    let targets: Vec<ProviderID> = switches.iter().map(|s| s.next()).collect();
    assert_eq!(targets, vec![b, c]);

    let mut propagator = KeplerianPropagator::new(circular_orbit(), DEFAULT_MASS, sequence);
    for switch in switches {
        propagator.add_event_detector(switch);
    }
    propagator.propagate(Epoch::from_seconds(500.0)).unwrap();

    // Both fired at the same date: which one wins is not part of the contract
    let active = propagator.attitude_provider().active_provider();
    assert!(active == Some(b) || active == Some(c), "{:?}", active);
}

/// Fails once the spacecraft has flown past a given date.
struct Brittle(Epoch);

impl EventDetector for Brittle {
    fn g(&self, state: &SpacecraftState) -> Result<f64> {
        if state.date() > self.0 {
            return Err(Error::Computation("sensor model out of range".into()));
        }
        Ok(1.0)
    }

    fn event_occurred(&self, _state: &SpacecraftState, _increasing: bool) -> Result<Action> {
        Ok(Action::Continue)
    }
}

#[test]
fn test_detector_errors_reach_the_caller() {
    let mut sequence = AttitudesSequence::new();
    let a = sequence.add_provider(yawed(0.0));
    let b = sequence.add_provider(yawed(1.0));
    sequence
        .add_switching_condition(a, Brittle(Epoch::from_seconds(400.0)), true, true, b)
        .unwrap();
    let switches = sequence.expose_detectors();

    let mut propagator = KeplerianPropagator::new(circular_orbit(), DEFAULT_MASS, sequence);
    for switch in switches {
        propagator.add_event_detector(switch);
    }

    let result = propagator.propagate(Epoch::from_seconds(1000.0));
    match result {
        Err(Error::Computation(e)) => assert_eq!(e.to_string(), "sensor model out of range"),
        other => panic!("unexpected result {:?}", other.map(|s| s.date())),
    }
    assert_eq!(propagator.attitude_provider().active_provider(), Some(a));
}
