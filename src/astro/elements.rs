use std::f64::consts::PI;

use nalgebra::{Rotation3, Unit, Vector3};

use super::pv::PVCoordinates;
use crate::error::{Error, Result};
use crate::math::anomaly::{
    eccentric_to_mean, eccentric_to_true, hyperbolic_to_mean, mean_to_eccentric,
    true_to_eccentric, true_to_hyperbolic,
};
use crate::math::geometry::{always_find_rotation, directed_angle};

/// Classical Keplerian description of a two-body orbit, plus the position
/// along it. Also exposes the equinoctial combinations of those angles, which
/// stay well-defined for circular and equatorial orbits.
#[derive(Debug, Clone, Copy)]
pub struct KeplerianElements {
    /// Moves the xy plane to the orbital plane, and x to point towards periapsis.
    rotation: Rotation3<f64>,
    /// (semimajor axis)^-1, which stays finite for parabolic orbits.
    alpha: f64,
    /// Semi-latus rectum
    slr: f64,
    true_anomaly: f64,
}

impl KeplerianElements {
    pub fn new(a: f64, ecc: f64, incl: f64, raan: f64, argp: f64, true_anomaly: f64) -> Self {
        KeplerianElements {
            rotation: rotation_from_angles(incl, raan, argp),
            alpha: a.recip(),
            slr: a * (1.0 - ecc * ecc),
            true_anomaly,
        }
    }

    /// Like [KeplerianElements::new], but placing the body by its mean
    /// anomaly. Only closed orbits are supported.
    pub fn from_mean_anomaly(
        a: f64,
        ecc: f64,
        incl: f64,
        raan: f64,
        argp: f64,
        mean_anomaly: f64,
    ) -> Result<Self> {
        if !(0.0..1.0).contains(&ecc) {
            return Err(Error::DegenerateOrbit(format!(
                "mean anomaly needs a closed orbit, got eccentricity {}",
                ecc
            )));
        }
        let eccentric_anomaly = mean_to_eccentric(mean_anomaly, ecc)?;
        let true_anomaly = eccentric_to_true(eccentric_anomaly, ecc);
        Ok(Self::new(a, ecc, incl, raan, argp, true_anomaly))
    }

    pub fn from_pv(pv: &PVCoordinates, mu: f64) -> Self {
        let position = &pv.position;
        let velocity = &pv.velocity;
        let r = position.norm();
        let energy = velocity.norm_squared() / 2.0 - mu / r;
        let ang_mom = position.cross(velocity);

        // LRL vector = v x h / mu - r/|r|
        let lrl = velocity.cross(&ang_mom) / mu - position / r;

        // Either the angular momentum or the LRL vector may be close to zero, so
        // we need a rotation that copes with that.
        let rotation = always_find_rotation(&ang_mom, &lrl, 1e-20);
        let true_anomaly = directed_angle(
            &(rotation * Vector3::x()),
            position,
            &(rotation * Vector3::z()),
        );

        KeplerianElements {
            rotation,
            alpha: -2.0 * energy / mu,
            slr: ang_mom.norm_squared() / mu,
            true_anomaly,
        }
    }

    /// Position and velocity of the body on this orbit.
    pub fn to_pv(&self, mu: f64) -> PVCoordinates {
        let e = self.eccentricity();
        let (sin, cos) = self.true_anomaly.sin_cos();
        let radius = self.slr / (1.0 + e * cos);
        let position = radius * Vector3::new(cos, sin, 0.0);
        let velocity = (mu / self.slr).sqrt() * Vector3::new(-sin, e + cos, 0.0);
        PVCoordinates::new(self.rotation * position, self.rotation * velocity)
    }

    // -- Axes --

    pub fn periapse_vector(&self) -> Unit<Vector3<f64>> {
        self.rotation * Vector3::x_axis()
    }

    pub fn normal_vector(&self) -> Unit<Vector3<f64>> {
        self.rotation * Vector3::z_axis()
    }

    pub fn asc_node_vector(&self) -> Unit<Vector3<f64>> {
        let v = Vector3::z().cross(&self.normal_vector());
        Unit::try_new(v, 1e-20).unwrap_or_else(|| self.periapse_vector())
    }

    // -- Classical elements --

    pub fn is_closed(&self) -> bool {
        self.alpha > 0.0
    }

    pub fn semimajor_axis(&self) -> f64 {
        self.alpha.recip()
    }

    pub fn semilatus_rectum(&self) -> f64 {
        self.slr
    }

    pub fn eccentricity(&self) -> f64 {
        // l = a(1-e^2), so e^2 = 1 - l/a. Round-off can push near-circular
        // orbits just below zero.
        (1.0 - self.slr * self.alpha).max(0.0).sqrt()
    }

    pub fn inclination(&self) -> f64 {
        self.normal_vector().angle(&Vector3::z())
    }

    /// Right ascension of the ascending node.
    pub fn raan(&self) -> f64 {
        directed_angle(&Vector3::x(), &self.asc_node_vector(), &Vector3::z())
    }

    pub fn arg_periapse(&self) -> f64 {
        directed_angle(
            &self.asc_node_vector(),
            &self.periapse_vector(),
            &self.normal_vector(),
        )
    }

    pub fn true_anomaly(&self) -> f64 {
        self.true_anomaly
    }

    /// Eccentric anomaly for closed orbits, hyperbolic anomaly for open ones.
    pub fn eccentric_anomaly(&self) -> f64 {
        let e = self.eccentricity();
        if self.is_closed() {
            true_to_eccentric(self.true_anomaly, e)
        } else {
            true_to_hyperbolic(self.true_anomaly, e)
        }
    }

    pub fn mean_anomaly(&self) -> f64 {
        let e = self.eccentricity();
        let anomaly = self.eccentric_anomaly();
        if self.is_closed() {
            eccentric_to_mean(anomaly, e)
        } else {
            hyperbolic_to_mean(anomaly, e)
        }
    }

    // -- Equinoctial elements --

    fn longitude_of_periapse(&self) -> f64 {
        self.arg_periapse() + self.raan()
    }

    pub fn equinoctial_ex(&self) -> f64 {
        self.eccentricity() * self.longitude_of_periapse().cos()
    }

    pub fn equinoctial_ey(&self) -> f64 {
        self.eccentricity() * self.longitude_of_periapse().sin()
    }

    pub fn hx(&self) -> f64 {
        (self.inclination() / 2.0).tan() * self.raan().cos()
    }

    pub fn hy(&self) -> f64 {
        (self.inclination() / 2.0).tan() * self.raan().sin()
    }

    /// True longitude argument.
    pub fn lv(&self) -> f64 {
        wrap_angle(self.true_anomaly + self.longitude_of_periapse())
    }

    /// Eccentric longitude argument.
    pub fn le(&self) -> f64 {
        wrap_angle(self.eccentric_anomaly() + self.longitude_of_periapse())
    }

    /// Mean longitude argument.
    pub fn lm(&self) -> f64 {
        wrap_angle(self.mean_anomaly() + self.longitude_of_periapse())
    }
}

fn wrap_angle(angle: f64) -> f64 {
    angle.rem_euclid(2.0 * PI)
}

fn rotation_from_angles(incl: f64, raan: f64, argp: f64) -> Rotation3<f64> {
    // Start with the periapsis along x in the xy plane. Turn about z by argp,
    // tip about x (now the ascending node) by the inclination, then swing the
    // node out to its longitude.
    Rotation3::from_axis_angle(&Vector3::z_axis(), raan)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), incl)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), argp)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const MU: f64 = 3.986004418e14;

    #[test]
    fn test_elements_round_trip() {
        let elements = KeplerianElements::new(
            7.5e6,
            0.2,
            30f64.to_radians(),
            40f64.to_radians(),
            50f64.to_radians(),
            60f64.to_radians(),
        );
        let recovered = KeplerianElements::from_pv(&elements.to_pv(MU), MU);

        assert_relative_eq!(recovered.semimajor_axis(), 7.5e6, max_relative = 1e-12);
        assert_relative_eq!(recovered.eccentricity(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(recovered.inclination(), 30f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(recovered.raan(), 40f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(recovered.arg_periapse(), 50f64.to_radians(), epsilon = 1e-10);
        assert_relative_eq!(recovered.true_anomaly(), 60f64.to_radians(), epsilon = 1e-10);
    }

    #[test]
    fn test_equinoctial_combinations() {
        let elements = KeplerianElements::new(7.0e6, 0.1, 0.5, 1.0, 0.25, 2.0);
        assert_relative_eq!(elements.equinoctial_ex(), 0.1 * 1.25f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(elements.equinoctial_ey(), 0.1 * 1.25f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(elements.hx(), 0.25f64.tan() * 1f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(elements.hy(), 0.25f64.tan() * 1f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(elements.lv(), 3.25, epsilon = 1e-12);
    }

    #[test]
    fn test_circular_orbit_longitude_is_well_defined() {
        // Equatorial circular orbit: only the true longitude means anything
        let r = 7.0e6;
        let v = (MU / r).sqrt();
        let angle = 2.0_f64;
        let pv = PVCoordinates::new(
            r * Vector3::new(angle.cos(), angle.sin(), 0.0),
            v * Vector3::new(-angle.sin(), angle.cos(), 0.0),
        );
        let elements = KeplerianElements::from_pv(&pv, MU);
        assert!(elements.eccentricity() < 1e-7);
        assert_relative_eq!(elements.inclination(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(elements.lv(), angle, epsilon = 1e-7);
    }

    #[test]
    fn test_placed_by_mean_anomaly() {
        for mean in [1.3, -2.5, 0.0] {
            let elements =
                KeplerianElements::from_mean_anomaly(7.5e6, 0.3, 0.4, 0.5, 0.6, mean).unwrap();
            assert_relative_eq!(elements.mean_anomaly(), mean, epsilon = 1e-10);
            assert_relative_eq!(elements.eccentricity(), 0.3, epsilon = 1e-12);
        }

        let result = KeplerianElements::from_mean_anomaly(-1.0e7, 1.5, 0.0, 0.0, 0.0, 0.5);
        assert!(matches!(result, Err(Error::DegenerateOrbit(_))));
    }

    #[test]
    fn test_hyperbolic_mean_anomaly_sign() {
        let elements = KeplerianElements::new(-1.0e7, 1.5, 0.0, 0.0, 0.0, 0.5);
        assert!(!elements.is_closed());
        assert!(elements.mean_anomaly() > 0.0);
    }
}
