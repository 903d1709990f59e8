//! Conversions between the true, eccentric/hyperbolic and mean anomalies.
//!
//! Results from the half-angle formulas land in (-pi, pi].

use super::root_finding::{find_root_bracket, newton_plus_bisection};
use crate::error::Result;

#[inline]
fn eccentric_factor(e: f64) -> f64 {
    ((1.0 - e) / (1.0 + e)).sqrt()
}

#[inline]
fn hyperbolic_factor(e: f64) -> f64 {
    ((e - 1.0) / (e + 1.0)).sqrt()
}

pub fn true_to_eccentric(true_anomaly: f64, e: f64) -> f64 {
    // tan(E/2) = sqrt((1-e)/(1+e)) * tan(theta/2)
    let tan_half_theta = (true_anomaly / 2.0).tan();
    2.0 * (tan_half_theta * eccentric_factor(e)).atan()
}

pub fn eccentric_to_true(eccentric_anomaly: f64, e: f64) -> f64 {
    let tan_half_ecc = (eccentric_anomaly / 2.0).tan();
    2.0 * (tan_half_ecc / eccentric_factor(e)).atan()
}

pub fn eccentric_to_mean(eccentric_anomaly: f64, e: f64) -> f64 {
    eccentric_anomaly - e * eccentric_anomaly.sin()
}

pub fn true_to_hyperbolic(true_anomaly: f64, e: f64) -> f64 {
    // tanh(H/2) = sqrt((e-1)/(e+1)) tan(theta/2)
    let tan_half_theta = (true_anomaly / 2.0).tan();
    2.0 * (tan_half_theta * hyperbolic_factor(e)).atanh()
}

pub fn hyperbolic_to_mean(hyperbolic_anomaly: f64, e: f64) -> f64 {
    e * hyperbolic_anomaly.sinh() - hyperbolic_anomaly
}

/// Solves Kepler's equation, M = E - e sin E, for closed orbits.
pub fn mean_to_eccentric(mean_anomaly: f64, e: f64) -> Result<f64> {
    let kepler = |x: f64| x - e * x.sin() - mean_anomaly;
    let kepler_der = |x: f64| 1.0 - e * x.cos();

    let bracket = find_root_bracket(kepler, mean_anomaly, e + 0.1, 100)?;
    newton_plus_bisection(|x| (kepler(x), kepler_der(x)), bracket, 100)
}
