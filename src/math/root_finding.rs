use super::intervals::Interval;
use crate::error::{Error, Result};

/// Very primitive way to construct a bracket for future root-finding.
/// Simply doubles the radius until a bracket with opposite signs at the
/// endpoints is found.
pub fn find_root_bracket(
    f: impl Fn(f64) -> f64,
    center: f64,
    mut radius: f64,
    num_iterations: usize,
) -> Result<Interval> {
    let initial_radius = radius;
    for _ in 0..num_iterations {
        let a = center - radius;
        let b = center + radius;

        if f(a) * f(b) <= 0.0 {
            return Ok(Interval::new(a, b));
        }

        radius *= 2.0;
    }

    Err(Error::NoBracket {
        center,
        radius: initial_radius,
    })
}

/// Shrinks a bracket around a sign change of `f` until it is no wider than
/// `tolerance`, and returns the final bracket. The root lies inside it, and
/// `f(hi)` has the sign `f` takes after the crossing.
///
/// `f` is fallible because event functions may delegate to user code; any
/// error is returned as-is.
pub fn bisection(
    mut f: impl FnMut(f64) -> Result<f64>,
    mut interval: Interval,
    tolerance: f64,
    num_iterations: usize,
) -> Result<Interval> {
    // We need to determine which way f is oriented in our interval.
    let lo_is_neg = f(interval.lo())? < 0.0;

    for _ in 0..num_iterations {
        if interval.width() <= tolerance || interval.is_exhausted() {
            return Ok(interval);
        }

        let guess = interval.midpoint();
        let value = f(guess)?;
        interval = match (lo_is_neg, value < 0.0) {
            (true, true) => interval.split_right(guess),   // - - +
            (true, false) => interval.split_left(guess),   // - + +
            (false, true) => interval.split_left(guess),   // + - -
            (false, false) => interval.split_right(guess), // + + -
        };
    }

    if interval.width() <= tolerance || interval.is_exhausted() {
        return Ok(interval);
    }
    Err(Error::MaxIterations {
        iterations: num_iterations,
        lo: interval.lo(),
        hi: interval.hi(),
    })
}

// Adapted from `rtsafe` in http://www.grad.hr/nastava/gs/prg/NumericalRecipesinC.pdf
#[allow(clippy::float_cmp)]
pub fn newton_plus_bisection(
    f_and_f_prime: impl Fn(f64) -> (f64, f64),
    mut interval: Interval,
    num_iterations: usize,
) -> Result<f64> {
    let mut guess = interval.midpoint();
    let lo_is_neg = f_and_f_prime(interval.lo()).0 < 0.0;

    for _ in 0..num_iterations {
        let (f, f_prime) = f_and_f_prime(guess);
        if f == 0.0 {
            return Ok(guess);
        }

        interval = match (lo_is_neg, f < 0.0) {
            (true, true) => interval.split_right(guess),
            (true, false) => interval.split_left(guess),
            (false, true) => interval.split_left(guess),
            (false, false) => interval.split_right(guess),
        };

        if interval.is_exhausted() {
            return Ok(guess);
        }

        // Take the Newton step only if it lands strictly inside the bracket;
        // otherwise it won't help us shrink the search space.
        let newton_guess = guess - f / f_prime;
        guess = if interval.contains(newton_guess)
            && newton_guess != interval.lo()
            && newton_guess != interval.hi()
        {
            newton_guess
        } else {
            interval.midpoint()
        };
    }

    Err(Error::MaxIterations {
        iterations: num_iterations,
        lo: interval.lo(),
        hi: interval.hi(),
    })
}
