//! Stumpff functions, used by the universal-variable form of Kepler's
//! equation.
//!
//! `c_k(x) = sum_i (-x)^i / (k + 2i)!`, which reduces to trigonometric
//! functions for positive `x` and hyperbolic ones for negative `x`.

use std::cmp::Ordering;

/// Below this magnitude, the closed forms for `c2` and `c3` lose too many
/// digits to cancellation, so we sum the series instead.
const SERIES_THRESHOLD: f64 = 1.0;

/// Enough terms that the series is exact to double precision for |x| < 1.
const SERIES_TERMS: usize = 12;

/// Returns `[G_0, G_1, G_2, G_3]`, where `G_k(beta, s) = s^k c_k(beta s^2)`.
#[allow(non_snake_case)]
pub fn stumpff_G(beta: f64, s: f64) -> [f64; 4] {
    let x = beta * s * s;
    let c = [c0(x), c1(x), c2(x), c3(x)];

    let mut s_power = 1.0;
    let mut output = [0.0; 4];
    for (k, c_k) in c.iter().enumerate() {
        output[k] = c_k * s_power;
        s_power *= s;
    }
    output
}

pub fn c0(x: f64) -> f64 {
    match x.partial_cmp(&0.0) {
        Some(Ordering::Greater) => x.sqrt().cos(),
        Some(Ordering::Less) => (-x).sqrt().cosh(),
        _ => 1.0,
    }
}

pub fn c1(x: f64) -> f64 {
    match x.partial_cmp(&0.0) {
        Some(Ordering::Greater) => x.sqrt().sin() / x.sqrt(),
        Some(Ordering::Less) => (-x).sqrt().sinh() / (-x).sqrt(),
        _ => 1.0,
    }
}

pub fn c2(x: f64) -> f64 {
    if x.abs() < SERIES_THRESHOLD {
        return series(2, x);
    }
    if x > 0.0 {
        // 1 - cos u = 2 sin^2(u/2)
        2.0 * (x.sqrt() / 2.0).sin().powi(2) / x
    } else {
        // 1 - cosh u = -2 sinh^2(u/2)
        -2.0 * ((-x).sqrt() / 2.0).sinh().powi(2) / x
    }
}

pub fn c3(x: f64) -> f64 {
    if x.abs() < SERIES_THRESHOLD {
        return series(3, x);
    }
    (1.0 - c1(x)) / x
}

fn series(k: u32, x: f64) -> f64 {
    // First term is 1/k!, and each following term picks up a factor of
    // -x / ((k + 2i + 1)(k + 2i + 2)).
    let mut term = (1..=k).fold(1.0, |acc, j| acc / j as f64);
    let mut total = term;
    for i in 0..SERIES_TERMS as u32 {
        let n = (k + 2 * i) as f64;
        term *= -x / ((n + 1.0) * (n + 2.0));
        total += term;
    }
    total
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_values_at_zero() {
        assert_eq!(c0(0.0), 1.0);
        assert_eq!(c1(0.0), 1.0);
        assert_relative_eq!(c2(0.0), 0.5);
        assert_relative_eq!(c3(0.0), 1.0 / 6.0);
    }

    #[test]
    fn test_series_matches_closed_form() {
        // Right at the threshold, both branches should agree closely
        for x in [-0.999_999_f64, 0.999_999, -0.5, 0.5, 1e-3] {
            let closed_c2 = if x > 0.0 {
                (1.0 - x.sqrt().cos()) / x
            } else {
                (1.0 - (-x).sqrt().cosh()) / x
            };
            let closed_c3 = (1.0 - c1(x)) / x;
            assert_relative_eq!(c2(x), closed_c2, max_relative = 1e-12);
            assert_relative_eq!(c3(x), closed_c3, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_recurrence() {
        // x c_{k+2}(x) = 1/k! - c_k(x)
        for x in [-20.0, -2.0, 3.0, 40.0] {
            assert_relative_eq!(x * c2(x), 1.0 - c0(x), max_relative = 1e-12);
            assert_relative_eq!(x * c3(x), 1.0 - c1(x), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_g_scaling() {
        let g = stumpff_G(0.0, 2.0);
        assert_relative_eq!(g[0], 1.0);
        assert_relative_eq!(g[1], 2.0);
        assert_relative_eq!(g[2], 2.0);
        assert_relative_eq!(g[3], 8.0 / 6.0);
    }
}
