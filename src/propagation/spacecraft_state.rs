use nalgebra::Vector1;
use tracing::trace;

use crate::astro::{
    Attitude, Epoch, Frame, KeplerianElements, OrbitState, PVCoordinates, PVCoordinatesProvider,
    TimeInterpolable, TimeShiftable, TimeStamped, Transform,
};
use crate::attitudes::{AttitudeProvider, LofOffset};
use crate::error::{Error, Mismatch, Result};
use crate::math::hermite::HermiteInterpolator;

/// Mass given to states built without one, in kg.
pub const DEFAULT_MASS: f64 = 1000.0;

/// Largest sample [SpacecraftState::interpolate] accepts. High-degree
/// polynomials oscillate wildly between nodes, so larger samples give worse
/// results, not better ones.
pub const MAX_INTERPOLATION_SAMPLES: usize = 20;

/// Everything known about the spacecraft at one date: where it is, how it is
/// oriented, and how heavy it is.
///
/// The orbit and the attitude always share their date and frame. States are
/// never modified; shifting or interpolating produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacecraftState {
    orbit: OrbitState,
    attitude: Attitude,
    mass: f64,
}

impl SpacecraftState {
    /// Uses the default mass and a VVLH-aligned attitude.
    pub fn from_orbit(orbit: OrbitState) -> Result<Self> {
        Self::from_orbit_and_mass(orbit, DEFAULT_MASS)
    }

    /// Uses a VVLH-aligned attitude.
    pub fn from_orbit_and_mass(orbit: OrbitState, mass: f64) -> Result<Self> {
        let attitude = LofOffset::vvlh().get_attitude(&orbit, orbit.date(), orbit.frame())?;
        Ok(SpacecraftState {
            orbit,
            attitude,
            mass,
        })
    }

    /// Uses the default mass.
    pub fn with_attitude(orbit: OrbitState, attitude: Attitude) -> Result<Self> {
        Self::new(orbit, attitude, DEFAULT_MASS)
    }

    pub fn new(orbit: OrbitState, attitude: Attitude, mass: f64) -> Result<Self> {
        check_consistency(&orbit, &attitude)?;
        Ok(SpacecraftState {
            orbit,
            attitude,
            mass,
        })
    }

    pub fn orbit(&self) -> &OrbitState {
        &self.orbit
    }

    pub fn attitude(&self) -> &Attitude {
        &self.attitude
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn frame(&self) -> &Frame {
        self.orbit.frame()
    }

    pub fn mu(&self) -> f64 {
        self.orbit.mu()
    }

    pub fn pv(&self) -> &PVCoordinates {
        self.orbit.pv()
    }

    /// Position and velocity in `frame`, which must be the state's own frame.
    pub fn pv_in(&self, frame: &Frame) -> Result<PVCoordinates> {
        self.orbit.pv_coordinates(self.date(), frame)
    }

    /// Transform from the reference frame to the spacecraft body frame.
    pub fn to_transform(&self) -> Transform {
        let pv = self.orbit.pv();
        Transform::from_active(
            self.date(),
            self.attitude.orientation(),
            pv.position,
            pv.velocity,
            self.attitude.spin(),
        )
    }

    pub fn elements(&self) -> KeplerianElements {
        self.orbit.elements()
    }

    pub fn keplerian_period(&self) -> Option<f64> {
        self.orbit.keplerian_period()
    }

    pub fn keplerian_mean_motion(&self) -> f64 {
        self.orbit.keplerian_mean_motion()
    }

    pub fn a(&self) -> f64 {
        self.orbit.semimajor_axis()
    }

    pub fn e(&self) -> f64 {
        self.elements().eccentricity()
    }

    pub fn i(&self) -> f64 {
        self.elements().inclination()
    }

    pub fn equinoctial_ex(&self) -> f64 {
        self.elements().equinoctial_ex()
    }

    pub fn equinoctial_ey(&self) -> f64 {
        self.elements().equinoctial_ey()
    }

    pub fn hx(&self) -> f64 {
        self.elements().hx()
    }

    pub fn hy(&self) -> f64 {
        self.elements().hy()
    }

    pub fn lv(&self) -> f64 {
        self.elements().lv()
    }

    pub fn le(&self) -> f64 {
        self.elements().le()
    }

    pub fn lm(&self) -> f64 {
        self.elements().lm()
    }
}

fn check_consistency(orbit: &OrbitState, attitude: &Attitude) -> Result<()> {
    if orbit.date() != attitude.date() {
        return Err(Error::Inconsistent(Mismatch::Dates {
            orbit: orbit.date(),
            attitude: attitude.date(),
        }));
    }
    if orbit.frame() != attitude.frame() {
        return Err(Error::Inconsistent(Mismatch::Frames {
            orbit: orbit.frame().name().to_owned(),
            attitude: attitude.frame().name().to_owned(),
        }));
    }
    Ok(())
}

impl TimeStamped for SpacecraftState {
    fn date(&self) -> Epoch {
        self.orbit.date()
    }
}

impl TimeShiftable for SpacecraftState {
    /// Keplerian motion for the orbit and constant spin for the attitude; the
    /// mass is kept. Only meant for short extrapolations: the error grows
    /// faster than linearly with `dt`.
    fn shifted_by(&self, dt: f64) -> Result<Self> {
        Ok(SpacecraftState {
            orbit: self.orbit.shifted_by(dt)?,
            attitude: self.attitude.shifted_by(dt)?,
            mass: self.mass,
        })
    }
}

impl TimeInterpolable for SpacecraftState {
    /// Interpolates orbit, attitude and mass independently, each from the
    /// sample's offsets to `date`. States sharing a date are only used once.
    fn interpolate(date: Epoch, sample: &[Self]) -> Result<Self> {
        let mut unique: Vec<&SpacecraftState> = Vec::with_capacity(sample.len());
        for state in sample {
            if unique.iter().all(|kept| kept.date() != state.date()) {
                unique.push(state);
            }
        }

        if unique.is_empty() {
            return Err(Error::EmptySample);
        }
        if unique.len() > MAX_INTERPOLATION_SAMPLES {
            return Err(Error::TooManySamples {
                count: unique.len(),
                max: MAX_INTERPOLATION_SAMPLES,
            });
        }
        trace!(
            %date,
            samples = unique.len(),
            duplicates = sample.len() - unique.len(),
            "interpolating spacecraft state"
        );

        let orbits: Vec<OrbitState> = unique.iter().map(|s| s.orbit.clone()).collect();
        let attitudes: Vec<Attitude> = unique.iter().map(|s| s.attitude.clone()).collect();

        let mut mass = HermiteInterpolator::<1>::new();
        for state in &unique {
            mass.add_sample_point(state.date() - date, &[Vector1::new(state.mass)])?;
        }

        Self::new(
            OrbitState::interpolate(date, &orbits)?,
            Attitude::interpolate(date, &attitudes)?,
            mass.value(0.0)?[0],
        )
    }
}
