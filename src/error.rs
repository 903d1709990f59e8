use thiserror::Error;

use crate::astro::Epoch;
use crate::attitudes::ProviderID;

#[derive(Debug, Error)]
pub enum Error {
    #[error("orbit and attitude are inconsistent: {0}")]
    Inconsistent(Mismatch),

    #[error("no attitude provider is active")]
    NoActiveProvider,

    #[error("attitude provider {0:?} does not belong to this sequence")]
    UnknownProvider(ProviderID),

    #[error("cannot transform coordinates from frame '{from}' to frame '{to}'")]
    FrameTransformUnsupported { from: String, to: String },

    #[error("interpolation sample is in frame '{actual}', expected '{expected}'")]
    SampleFrameMismatch { expected: String, actual: String },

    #[error("cannot propagate backwards from {current} to {target}")]
    BackwardPropagation { current: Epoch, target: Epoch },

    #[error("step size must be positive, got {0}")]
    InvalidStep(f64),

    #[error("cannot interpolate from an empty sample")]
    EmptySample,

    #[error("too many interpolation samples: got {count}, at most {max} are allowed")]
    TooManySamples { count: usize, max: usize },

    #[error("duplicate abscissa {0} in interpolation sample")]
    DuplicateAbscissa(f64),

    #[error("unable to bracket a root starting at {center} with radius {radius}")]
    NoBracket { center: f64, radius: f64 },

    #[error("hit max iterations ({iterations}) when trying to find a root in [{lo}, {hi}]")]
    MaxIterations { iterations: usize, lo: f64, hi: f64 },

    #[error("degenerate orbit: {0}")]
    DegenerateOrbit(String),

    #[error(transparent)]
    Computation(Box<dyn std::error::Error + Send + Sync>),
}

/// Which invariant of a spacecraft state was violated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Mismatch {
    #[error("orbit date {orbit} does not match attitude date {attitude}")]
    Dates { orbit: Epoch, attitude: Epoch },

    #[error("orbit frame '{orbit}' does not match attitude frame '{attitude}'")]
    Frames { orbit: String, attitude: String },
}

pub type Result<T> = std::result::Result<T, Error>;
