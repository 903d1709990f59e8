use std::f64::consts::PI;

use nalgebra::Vector3;

use super::elements::KeplerianElements;
use super::frame::Frame;
use super::pv::{PVCoordinates, PVCoordinatesProvider};
use super::time::{Epoch, TimeInterpolable, TimeShiftable, TimeStamped};
use crate::error::{Error, Result};
use crate::math::hermite::HermiteInterpolator;
use crate::math::root_finding::{find_root_bracket, newton_plus_bisection};
use crate::math::stumpff::stumpff_G;

const NUM_ITERATIONS_DELTA_T: usize = 200;

/// Two-body orbital state: Cartesian position and velocity of the spacecraft
/// around a central body with gravitational parameter `mu`, at a date, in a
/// frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitState {
    date: Epoch,
    frame: Frame,
    pv: PVCoordinates,
    mu: f64,
}

impl OrbitState {
    pub fn new(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        date: Epoch,
        frame: Frame,
        mu: f64,
    ) -> Result<Self> {
        Self::from_pv(PVCoordinates::new(position, velocity), date, frame, mu)
    }

    pub fn from_pv(pv: PVCoordinates, date: Epoch, frame: Frame, mu: f64) -> Result<Self> {
        if !(mu > 0.0 && mu.is_finite()) {
            return Err(Error::DegenerateOrbit(format!(
                "gravitational parameter must be positive, got {}",
                mu
            )));
        }
        let finite = pv.position.iter().chain(pv.velocity.iter()).all(|x| x.is_finite());
        if !finite || pv.position.norm() == 0.0 {
            return Err(Error::DegenerateOrbit(format!(
                "position {:?} and velocity {:?} do not describe an orbit",
                pv.position, pv.velocity
            )));
        }

        Ok(OrbitState { date, frame, pv, mu })
    }

    pub fn from_elements(
        elements: &KeplerianElements,
        date: Epoch,
        frame: Frame,
        mu: f64,
    ) -> Result<Self> {
        Self::from_pv(elements.to_pv(mu), date, frame, mu)
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn pv(&self) -> &PVCoordinates {
        &self.pv
    }

    pub fn position(&self) -> Vector3<f64> {
        self.pv.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.pv.velocity
    }

    pub fn energy(&self) -> f64 {
        // KE = 1/2 v^2, PE = - mu/r
        self.pv.velocity.norm_squared() / 2.0 - self.mu / self.pv.position.norm()
    }

    pub fn elements(&self) -> KeplerianElements {
        KeplerianElements::from_pv(&self.pv, self.mu)
    }

    pub fn semimajor_axis(&self) -> f64 {
        -self.mu / (2.0 * self.energy())
    }

    /// `None` for open orbits.
    pub fn keplerian_period(&self) -> Option<f64> {
        let a = self.semimajor_axis();
        if a > 0.0 {
            Some(2.0 * PI * (a.powi(3) / self.mu).sqrt())
        } else {
            None
        }
    }

    pub fn keplerian_mean_motion(&self) -> f64 {
        (self.mu / self.semimajor_axis().abs().powi(3)).sqrt()
    }

    /// Advances along the conic by a universal anomaly of `delta_s`.
    #[allow(non_snake_case)]
    fn advance_s(&self, delta_s: f64) -> PVCoordinates {
        let beta = -2.0 * self.energy();
        let mu = self.mu;
        let G: [f64; 4] = stumpff_G(beta, delta_s);

        let position = self.pv.position;
        let velocity = self.pv.velocity;
        let r_0 = position.norm();
        let r_dot_0 = position.dot(&velocity) / r_0;

        let f = 1.0 - mu / r_0 * G[2];
        let g = r_0 * G[1] + r_0 * r_dot_0 * G[2];

        let new_position = f * position + g * velocity;
        let new_r = new_position.norm();

        let f_dot = -mu / r_0 / new_r * G[1];
        let g_dot = r_0 / new_r * (G[0] + r_dot_0 * G[1]);

        PVCoordinates::new(new_position, f_dot * position + g_dot * velocity)
    }

    /// Universal anomaly reached after `delta_t` seconds.
    #[allow(non_snake_case)]
    fn delta_t_to_s(&self, delta_t: f64) -> Result<f64> {
        // Since ds/dt = 1/r, s and t are monotonically related, so there's a
        // unique solution.
        let beta = -2.0 * self.energy();
        let mu = self.mu;
        let r_0 = self.pv.position.norm();
        let r_dot_0 = self.pv.position.dot(&self.pv.velocity) / r_0;

        // Monotonically increasing in s:
        //  r_0 * G_1(β, s) + r_0 * r_dot_0 * G_2(β, s) + mu * G_3(β, s) - delta_t
        let f_and_f_prime = |s: f64| {
            let G = stumpff_G(beta, s);
            let f = r_0 * G[1] + r_0 * r_dot_0 * G[2] + mu * G[3] - delta_t;
            let f_prime = r_0 * G[0] + r_0 * r_dot_0 * G[1] + mu * G[2];
            (f, f_prime)
        };

        let bracket = find_root_bracket(
            |x| f_and_f_prime(x).0,
            delta_t / r_0,
            delta_t / r_0,
            NUM_ITERATIONS_DELTA_T,
        )?;
        newton_plus_bisection(f_and_f_prime, bracket, NUM_ITERATIONS_DELTA_T)
    }
}

impl TimeStamped for OrbitState {
    fn date(&self) -> Epoch {
        self.date
    }
}

impl TimeShiftable for OrbitState {
    /// Keplerian motion for `dt` seconds.
    fn shifted_by(&self, dt: f64) -> Result<Self> {
        if dt == 0.0 {
            return Ok(self.clone());
        }
        let delta_s = self.delta_t_to_s(dt)?;
        Ok(OrbitState {
            date: self.date.shifted_by(dt),
            frame: self.frame.clone(),
            pv: self.advance_s(delta_s),
            mu: self.mu,
        })
    }
}

impl TimeInterpolable for OrbitState {
    /// Hermite interpolation of the positions, with the velocities as their
    /// derivatives. Samples must share one frame and have distinct dates.
    fn interpolate(date: Epoch, sample: &[Self]) -> Result<Self> {
        let first = sample.first().ok_or(Error::EmptySample)?;

        let mut interpolator = HermiteInterpolator::<3>::new();
        for orbit in sample {
            if orbit.frame != first.frame {
                return Err(Error::SampleFrameMismatch {
                    expected: first.frame.name().to_owned(),
                    actual: orbit.frame.name().to_owned(),
                });
            }
            interpolator
                .add_sample_point(orbit.date - date, &[orbit.position(), orbit.velocity()])?;
        }

        let (position, velocity) = interpolator.value_and_derivative(0.0)?;
        Self::new(position, velocity, date, first.frame.clone(), first.mu)
    }
}

impl PVCoordinatesProvider for OrbitState {
    fn pv_coordinates(&self, date: Epoch, frame: &Frame) -> Result<PVCoordinates> {
        if *frame != self.frame {
            return Err(Error::FrameTransformUnsupported {
                from: self.frame.name().to_owned(),
                to: frame.name().to_owned(),
            });
        }
        Ok(*self.shifted_by(date - self.date)?.pv())
    }
}
