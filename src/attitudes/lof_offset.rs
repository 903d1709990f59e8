use nalgebra::{UnitQuaternion, Vector3};

use super::AttitudeProvider;
use crate::astro::{Attitude, Epoch, Frame, PVCoordinates, PVCoordinatesProvider};
use crate::error::{Error, Result};
use crate::math::geometry::rotation_from_axes;

/// Local orbital frames, built from the position and velocity at each date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LofType {
    /// Vehicle Velocity, Local Horizontal: z towards the central body, y
    /// against the orbital momentum, x roughly along the velocity.
    Vvlh,
    /// Local Vertical, Local Horizontal: x along the position, z along the
    /// orbital momentum.
    Lvlh,
}

impl LofType {
    fn axes(&self, pv: &PVCoordinates) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        let r_hat = pv.position.normalize();
        let h_hat = pv.momentum().normalize();
        match self {
            LofType::Vvlh => {
                let y = -h_hat;
                let z = -r_hat;
                (y.cross(&z), y, z)
            }
            LofType::Lvlh => {
                let x = r_hat;
                let z = h_hat;
                (x, z.cross(&x), z)
            }
        }
    }
}

/// Keeps the body axes at a fixed offset from a local orbital frame.
#[derive(Debug, Clone, Copy)]
pub struct LofOffset {
    lof: LofType,
    /// Body orientation relative to the local orbital frame
    offset: UnitQuaternion<f64>,
}

impl LofOffset {
    pub fn new(lof: LofType, offset: UnitQuaternion<f64>) -> Self {
        LofOffset { lof, offset }
    }

    pub fn vvlh() -> Self {
        Self::new(LofType::Vvlh, UnitQuaternion::identity())
    }

    pub fn lvlh() -> Self {
        Self::new(LofType::Lvlh, UnitQuaternion::identity())
    }

    pub fn lof(&self) -> LofType {
        self.lof
    }
}

impl Default for LofOffset {
    fn default() -> Self {
        Self::vvlh()
    }
}

impl AttitudeProvider for LofOffset {
    fn get_attitude(
        &self,
        pv: &dyn PVCoordinatesProvider,
        date: Epoch,
        frame: &Frame,
    ) -> Result<Attitude> {
        let pv = pv.pv_coordinates(date, frame)?;
        let momentum = pv.momentum();
        let r_squared = pv.position.norm_squared();
        if momentum.norm() == 0.0 || r_squared == 0.0 {
            return Err(Error::DegenerateOrbit(format!(
                "no local orbital frame for position {:?} and velocity {:?}",
                pv.position, pv.velocity
            )));
        }

        let (x, y, z) = self.lof.axes(&pv);
        let orientation = rotation_from_axes(&x, &y, &z) * self.offset;

        // The local frame turns with the position vector
        let spin = momentum / r_squared;

        Ok(Attitude::new(date, frame.clone(), orientation, spin))
    }
}
