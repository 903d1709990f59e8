use super::AttitudeProvider;
use crate::astro::{Attitude, Epoch, Frame, PVCoordinatesProvider, TimeShiftable, TimeStamped};
use crate::error::{Error, Result};

/// Spins at the constant rate of a reference attitude, starting from that
/// attitude at its date.
#[derive(Debug, Clone)]
pub struct FixedRate {
    reference: Attitude,
}

impl FixedRate {
    pub fn new(reference: Attitude) -> Self {
        FixedRate { reference }
    }

    pub fn reference(&self) -> &Attitude {
        &self.reference
    }
}

impl AttitudeProvider for FixedRate {
    fn get_attitude(
        &self,
        _pv: &dyn PVCoordinatesProvider,
        date: Epoch,
        frame: &Frame,
    ) -> Result<Attitude> {
        if frame != self.reference.frame() {
            return Err(Error::FrameTransformUnsupported {
                from: self.reference.frame().name().to_owned(),
                to: frame.name().to_owned(),
            });
        }
        self.reference.shifted_by(date - self.reference.date())
    }
}
