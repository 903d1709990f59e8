//! Spacecraft states, and the machinery that produces them over time.

pub mod events;
mod keplerian;
mod mapper;
mod spacecraft_state;

pub use keplerian::{KeplerianPropagator, PropagatorSettings};
pub use mapper::{StateMapper, STATE_DIMENSION};
pub use spacecraft_state::{SpacecraftState, DEFAULT_MASS, MAX_INTERPOLATION_SAMPLES};
