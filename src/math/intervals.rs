use std::fmt::Display;

/// A closed interval `[lo, hi]`, used to bracket roots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Interval {
        if lo <= hi {
            Self { lo, hi }
        } else {
            Self { lo: hi, hi: lo }
        }
    }

    fn new_unchecked(lo: f64, hi: f64) -> Interval {
        debug_assert!(lo <= hi);
        Self { lo, hi }
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// Keeps the part of the interval to the left of `mid`. Values outside the
    /// interval are clamped.
    pub fn split_left(&self, mid: f64) -> Self {
        Self::new_unchecked(self.lo, mid.clamp(self.lo, self.hi))
    }

    /// Keeps the part of the interval to the right of `mid`.
    pub fn split_right(&self, mid: f64) -> Self {
        Self::new_unchecked(mid.clamp(self.lo, self.hi), self.hi)
    }

    /// True when the floating point midpoint can no longer separate the ends.
    #[allow(clippy::float_cmp)]
    pub fn is_exhausted(&self) -> bool {
        let mid = self.midpoint();
        mid == self.lo || mid == self.hi
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}
