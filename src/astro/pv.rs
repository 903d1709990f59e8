use nalgebra::Vector3;

use super::frame::Frame;
use super::time::Epoch;
use crate::error::Result;

/// Position and velocity of a point, in some frame that the owner keeps track of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PVCoordinates {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl PVCoordinates {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        PVCoordinates { position, velocity }
    }

    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Specific angular momentum, r x v.
    pub fn momentum(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }

    /// Linear extrapolation, ignoring any acceleration.
    pub fn shifted_by(&self, dt: f64) -> Self {
        Self::new(self.position + dt * self.velocity, self.velocity)
    }
}

/// Something that can report where it is at a given date.
pub trait PVCoordinatesProvider {
    fn pv_coordinates(&self, date: Epoch, frame: &Frame) -> Result<PVCoordinates>;
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_momentum_and_shift() {
        let pv = PVCoordinates::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(pv.momentum(), Vector3::new(0.0, 0.0, 2.0));

        let shifted = pv.shifted_by(1.5);
        assert_relative_eq!(shifted.position, Vector3::new(1.0, 3.0, 0.0));
        assert_relative_eq!(shifted.velocity, pv.velocity);
    }
}
