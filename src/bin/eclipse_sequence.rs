use std::f64::consts::FRAC_PI_2;

use clap::Parser;
use nalgebra::{UnitQuaternion, Vector3};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_attitudes::astro::{Epoch, Frame, KeplerianElements, OrbitState, TimeStamped};
use rust_attitudes::attitudes::{AttitudesSequence, InertialProvider, LofOffset, ProviderID};
use rust_attitudes::consts::{EARTH_EQUATORIAL_RADIUS, EARTH_MU};
use rust_attitudes::error::Result;
use rust_attitudes::propagation::events::{EclipseDetector, EventDetector};
use rust_attitudes::propagation::{KeplerianPropagator, DEFAULT_MASS};

/// Flies a circular orbit pointing along the local vertical in sunlight and
/// holding an inertial attitude in eclipse, and prints where the switches
/// happen.
#[derive(Debug, Parser)]
struct Args {
    /// Orbit altitude above the equatorial radius, in km
    #[arg(long, env = "ECLIPSE_ALTITUDE_KM", default_value_t = 600.0)]
    altitude: f64,

    /// Orbit inclination, in degrees
    #[arg(long, env = "ECLIPSE_INCLINATION_DEG", default_value_t = 30.0)]
    inclination: f64,

    /// Direction of the sun in the inertial frame, as x,y,z
    #[arg(
        long,
        env = "ECLIPSE_SUN",
        value_delimiter = ',',
        num_args = 3,
        default_values_t = [1.0, 0.2, 0.0]
    )]
    sun: Vec<f64>,

    /// Number of orbits to fly
    #[arg(long, env = "ECLIPSE_ORBITS", default_value_t = 3.0)]
    orbits: f64,

    /// Interval between printed rows, in s
    #[arg(long, env = "ECLIPSE_STEP", default_value_t = 120.0)]
    step: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let sun = Vector3::new(args.sun[0], args.sun[1], args.sun[2]);

    let frame = Frame::inertial("EME2000");
    let radius = EARTH_EQUATORIAL_RADIUS + args.altitude * 1000.0;
    let elements =
        KeplerianElements::new(radius, 0.0, args.inclination.to_radians(), 0.0, 0.0, 0.0);
    let orbit = OrbitState::from_elements(&elements, Epoch::ORIGIN, frame, EARTH_MU)?;
    let period = orbit.keplerian_period().unwrap_or(0.0);
    info!(radius, period, "initial orbit");

    let entry = EclipseDetector::entry(sun, EARTH_EQUATORIAL_RADIUS);
    let exit = EclipseDetector::exit(sun, EARTH_EQUATORIAL_RADIUS);

    let mut sequence = AttitudesSequence::new();
    let sunlit = sequence.add_provider(LofOffset::lvlh());
    let eclipse = sequence.add_provider(InertialProvider::new(UnitQuaternion::from_axis_angle(
        &Vector3::y_axis(),
        FRAC_PI_2,
    )));
    sequence.add_switching_condition(sunlit, entry.clone(), true, false, eclipse)?;
    sequence.add_switching_condition(eclipse, exit.clone(), true, false, sunlit)?;

    let mut propagator = KeplerianPropagator::new(orbit, DEFAULT_MASS, sequence);
    let switches = propagator.attitude_provider_mut().expose_detectors();
    let watcher = switches[0].clone();
    for switch in switches {
        propagator.add_event_detector(switch);
    }

    let name = |id: Option<ProviderID>| match id {
        Some(id) if id == sunlit => "sunlit",
        Some(id) if id == eclipse => "eclipse",
        _ => "none",
    };
    println!(
        "{:>10} {:>8} {:>8} {:>14} {:>14}",
        "t (s)", "mode", "shadow", "g entry", "g exit"
    );
    let mut failure = None;
    let target = Epoch::from_seconds(args.orbits * period);
    let last = propagator.propagate_with_handler(target, args.step, |state, _| {
        match (entry.g(state), exit.g(state)) {
            (Ok(g_entry), Ok(g_exit)) => println!(
                "{:>10.1} {:>8} {:>8} {:>14.3} {:>14.3}",
                state.date().seconds(),
                name(watcher.active_provider()),
                entry.is_in_shadow(state),
                g_entry,
                g_exit
            ),
            (Err(e), _) | (_, Err(e)) => failure = Some(e),
        }
    })?;
    if let Some(e) = failure {
        return Err(e);
    }

    info!(
        date = %last.date(),
        active = name(propagator.attitude_provider().active_provider()),
        "done"
    );
    Ok(())
}
