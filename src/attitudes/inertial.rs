use nalgebra::{UnitQuaternion, Vector3};

use super::AttitudeProvider;
use crate::astro::{Attitude, Epoch, Frame, PVCoordinatesProvider};
use crate::error::Result;

/// Holds a constant orientation with respect to whichever frame is requested.
#[derive(Debug, Clone, Copy)]
pub struct InertialProvider {
    orientation: UnitQuaternion<f64>,
}

impl InertialProvider {
    pub fn new(orientation: UnitQuaternion<f64>) -> Self {
        InertialProvider { orientation }
    }

    /// Body axes aligned with the reference axes.
    pub fn aligned() -> Self {
        Self::new(UnitQuaternion::identity())
    }
}

impl AttitudeProvider for InertialProvider {
    fn get_attitude(
        &self,
        _pv: &dyn PVCoordinatesProvider,
        date: Epoch,
        frame: &Frame,
    ) -> Result<Attitude> {
        Ok(Attitude::new(
            date,
            frame.clone(),
            self.orientation,
            Vector3::zeros(),
        ))
    }
}
