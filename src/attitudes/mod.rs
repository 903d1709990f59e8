//! Orientation laws, and the sequencer that switches between them when events
//! occur.

mod fixed_rate;
mod inertial;
mod lof_offset;
mod sequence;

use crate::astro::{Attitude, Epoch, Frame, PVCoordinatesProvider};
use crate::error::Result;

pub use fixed_rate::FixedRate;
pub use inertial::InertialProvider;
pub use lof_offset::{LofOffset, LofType};
pub use sequence::{AttitudesSequence, Switch};

/// Handle to an attitude provider owned by an [AttitudesSequence].
///
/// Two handles are the same provider iff they were handed out by the same
/// sequence for the same slot, regardless of how the providers behind them are
/// configured. A sequence rejects handles that another sequence handed out.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProviderID {
    sequence: usize,
    index: usize,
}

impl ProviderID {
    fn new(sequence: usize, index: usize) -> Self {
        ProviderID { sequence, index }
    }

    /// Position of the provider within its sequence, in the order providers
    /// were added.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// An orientation law: computes the attitude of a spacecraft whose trajectory
/// is given by `pv`.
pub trait AttitudeProvider {
    fn get_attitude(
        &self,
        pv: &dyn PVCoordinatesProvider,
        date: Epoch,
        frame: &Frame,
    ) -> Result<Attitude>;
}

impl<T: AttitudeProvider + ?Sized> AttitudeProvider for Box<T> {
    fn get_attitude(
        &self,
        pv: &dyn PVCoordinatesProvider,
        date: Epoch,
        frame: &Frame,
    ) -> Result<Attitude> {
        (**self).get_attitude(pv, date, frame)
    }
}
