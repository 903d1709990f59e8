use std::f64::consts::PI;

// WGS84 values
pub const EARTH_MU: f64 = 3.986004418e14;
pub const EARTH_EQUATORIAL_RADIUS: f64 = 6_378_137.0;

pub fn get_circular_velocity(radius: f64, mu: f64) -> f64 {
    (mu / radius).sqrt()
}

pub fn get_period(a: f64, mu: f64) -> f64 {
    (4.0 * PI * PI * a.powi(3) / mu).sqrt()
}
