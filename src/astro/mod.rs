//! Time, frames and the kinematic building blocks of a spacecraft state.
//!
//! - [OrbitState]: two-body Cartesian orbit, which can be shifted along its
//!   conic and interpolated from nearby samples
//! - [Attitude]: orientation and spin with respect to a [Frame]
//! - [Epoch] and the [TimeStamped], [TimeShiftable] and [TimeInterpolable]
//!   traits that tie them together

mod attitude;
mod elements;
mod frame;
mod orbit;
mod pv;
mod time;
mod transform;

pub use attitude::Attitude;
pub use elements::KeplerianElements;
pub use frame::Frame;
pub use orbit::OrbitState;
pub use pv::{PVCoordinates, PVCoordinatesProvider};
pub use time::{Epoch, TimeInterpolable, TimeShiftable, TimeStamped};
pub use transform::Transform;
