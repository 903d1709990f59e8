use nalgebra::Vector3;

use super::SpacecraftState;
use crate::astro::{Epoch, Frame, OrbitState, TimeStamped};
use crate::attitudes::AttitudeProvider;
use crate::error::{Error, Result};

/// Length of the raw state vector: position, velocity, mass.
pub const STATE_DIMENSION: usize = 7;

/// Converts between raw state vectors `[x, y, z, vx, vy, vz, mass]`, dated by
/// their offset from a reference date, and full spacecraft states.
#[derive(Debug, Clone)]
pub struct StateMapper {
    reference_date: Epoch,
    frame: Frame,
    mu: f64,
}

impl StateMapper {
    pub fn new(reference_date: Epoch, frame: Frame, mu: f64) -> Self {
        StateMapper {
            reference_date,
            frame,
            mu,
        }
    }

    pub fn reference_date(&self) -> Epoch {
        self.reference_date
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Builds the state at `reference_date + t`, asking `provider` for the
    /// attitude.
    pub fn map_array_to_state(
        &self,
        t: f64,
        y: &[f64; STATE_DIMENSION],
        provider: &dyn AttitudeProvider,
    ) -> Result<SpacecraftState> {
        let date = self.reference_date.shifted_by(t);
        let orbit = OrbitState::new(
            Vector3::new(y[0], y[1], y[2]),
            Vector3::new(y[3], y[4], y[5]),
            date,
            self.frame.clone(),
            self.mu,
        )?;
        let attitude = provider.get_attitude(&orbit, date, &self.frame)?;
        SpacecraftState::new(orbit, attitude, y[6])
    }

    /// Inverse of [map_array_to_state](Self::map_array_to_state). The attitude
    /// is dropped.
    pub fn map_state_to_array(
        &self,
        state: &SpacecraftState,
    ) -> Result<(f64, [f64; STATE_DIMENSION])> {
        if *state.frame() != self.frame {
            return Err(Error::FrameTransformUnsupported {
                from: state.frame().name().to_owned(),
                to: self.frame.name().to_owned(),
            });
        }

        let pv = state.pv();
        let y = [
            pv.position.x,
            pv.position.y,
            pv.position.z,
            pv.velocity.x,
            pv.velocity.y,
            pv.velocity.z,
            state.mass(),
        ];
        Ok((state.date() - self.reference_date, y))
    }
}
