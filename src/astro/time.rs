use std::fmt;
use std::ops::{Add, Sub};

use crate::error::Result;

/// An absolute date, stored as seconds elapsed since an arbitrary fixed origin.
///
/// Differences between epochs are plain `f64` durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Epoch(f64);

impl Epoch {
    pub const ORIGIN: Epoch = Epoch(0.0);

    pub fn from_seconds(seconds: f64) -> Self {
        Epoch(seconds)
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }

    pub fn shifted_by(&self, dt: f64) -> Self {
        Epoch(self.0 + dt)
    }

    /// Signed duration from `other` to `self`.
    pub fn duration_from(&self, other: Epoch) -> f64 {
        self.0 - other.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{:+.6}s", self.0)
    }
}

impl Add<f64> for Epoch {
    type Output = Epoch;

    fn add(self, dt: f64) -> Epoch {
        self.shifted_by(dt)
    }
}

impl Sub for Epoch {
    type Output = f64;

    fn sub(self, other: Epoch) -> f64 {
        self.duration_from(other)
    }
}

/// Anything that is attached to a single date.
pub trait TimeStamped {
    fn date(&self) -> Epoch;
}

/// Values that can be extrapolated a short time away with a simple model.
pub trait TimeShiftable: Sized {
    fn shifted_by(&self, dt: f64) -> Result<Self>;
}

/// Values that can be rebuilt at any date from a few samples at nearby dates.
pub trait TimeInterpolable: Sized {
    fn interpolate(date: Epoch, sample: &[Self]) -> Result<Self>;
}
