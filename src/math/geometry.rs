use std::f64::consts::PI;

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

/// Computes the vector rejection of u from v. v must be non-zero.
pub fn reject(u: &Vector3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    let u_proj_v = u.dot(v) * v / v.norm_squared();
    u - u_proj_v
}

/// Returns the angle between u and v, measured as a positive angle around `up`.
pub fn directed_angle(u: &Vector3<f64>, v: &Vector3<f64>, up: &Vector3<f64>) -> f64 {
    let theta = u.angle(v);
    if u.cross(v).dot(up) >= 0.0 {
        theta
    } else {
        2.0 * PI - theta
    }
}

/// Returns the rotation sending the standard z- and x-axes to `new_z` and the
/// part of `new_x` perpendicular to it.
///
/// When either input is shorter than `tolerance`, a semi-canonical fallback is
/// used instead of failing:
/// - small `new_z`: the most z-like vector perpendicular to `new_x`, or y if
///   `new_x` is itself along z
/// - small `new_x`: the most x-like vector perpendicular to `new_z`, or -y if
///   `new_z` is itself along x
/// - both small: the identity
pub fn always_find_rotation(
    new_z: &Vector3<f64>,
    new_x: &Vector3<f64>,
    tolerance: f64,
) -> Rotation3<f64> {
    let z_large_enough = new_z.norm() >= tolerance;
    let x_large_enough = new_x.norm() >= tolerance;

    let (new_z, new_x) = match (z_large_enough, x_large_enough) {
        (true, true) => (*new_z, *new_x),
        (false, true) => {
            let mut best_new_z = reject(&Vector3::z(), new_x);
            if best_new_z.norm() < tolerance {
                best_new_z = Vector3::y();
            }
            (best_new_z, *new_x)
        }
        (true, false) => {
            let mut best_new_x = reject(&Vector3::x(), new_z);
            if best_new_x.norm() < tolerance {
                best_new_x = -Vector3::y();
            }
            (*new_z, best_new_x)
        }
        (false, false) => return Rotation3::identity(),
    };

    // face_towards takes the new z and new y, so prepend a quarter turn about z
    // (x to y).
    let mut rotation = Rotation3::face_towards(&new_z, &new_x);
    rotation *= Rotation3::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
    rotation.renormalize();
    rotation
}

/// Rotation whose columns are the given x, y, z axes.
/// The axes are not checked for orthonormality.
pub fn rotation_from_axes(
    x: &Vector3<f64>,
    y: &Vector3<f64>,
    z: &Vector3<f64>,
) -> UnitQuaternion<f64> {
    let matrix = Matrix3::from_columns(&[*x, *y, *z]);
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(matrix))
}

/// Below this angle the rotation vector coefficients use their series.
const SMALL_ANGLE: f64 = 1e-3;

/// Time derivative of the rotation vector `r` of a rotation `R = exp(r)`
/// turning at angular velocity `omega`, where `omega` is expressed in the
/// rotated frame's parent (so `dR/dt = [omega]x R`).
pub fn rotation_vector_rate(r: &Vector3<f64>, omega: &Vector3<f64>) -> Vector3<f64> {
    let theta = r.norm();
    // (1 - (theta/2) cot(theta/2)) / theta^2
    let c = if theta < SMALL_ANGLE {
        1.0 / 12.0 + theta * theta / 720.0
    } else {
        1.0 / (theta * theta) - (1.0 + theta.cos()) / (2.0 * theta * theta.sin())
    };
    let r_cross_omega = r.cross(omega);
    omega - 0.5 * r_cross_omega + c * r.cross(&r_cross_omega)
}

/// Inverse of [rotation_vector_rate]: the angular velocity that makes the
/// rotation vector `r` change at `r_dot`.
pub fn angular_velocity_from_rate(r: &Vector3<f64>, r_dot: &Vector3<f64>) -> Vector3<f64> {
    let theta = r.norm();
    let theta2 = theta * theta;
    let (a, b) = if theta < SMALL_ANGLE {
        (0.5 - theta2 / 24.0, 1.0 / 6.0 - theta2 / 120.0)
    } else {
        (
            (1.0 - theta.cos()) / theta2,
            (theta - theta.sin()) / (theta2 * theta),
        )
    };
    let r_cross_rate = r.cross(r_dot);
    r_dot + a * r_cross_rate + b * r.cross(&r_cross_rate)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_reject() {
        assert_relative_eq!(
            reject(&Vector3::new(4.0, 5.0, 7.0), &Vector3::new(1.0, 2.0, 3.0)),
            Vector3::new(1.5, 0.0, -0.5),
        );
        assert_relative_eq!(
            reject(&Vector3::zeros(), &Vector3::new(1.0, 2.0, 3.0)),
            Vector3::zeros(),
        );
    }

    #[test]
    fn test_directed_angle() {
        let angle = directed_angle(&Vector3::x(), &Vector3::y(), &Vector3::z());
        assert_relative_eq!(angle, PI / 2.0);
        let angle = directed_angle(&Vector3::x(), &Vector3::y(), &-Vector3::z());
        assert_relative_eq!(angle, 3.0 * PI / 2.0);
    }

    #[test]
    fn test_rotation_sends_axes() {
        let u = Vector3::new(1.0, 2.0, 3.0);
        let v = Vector3::new(2.0, 2.0, -2.0);
        let r = always_find_rotation(&u, &v, 1e-20);
        assert_relative_eq!(r * Vector3::z(), u.normalize(), epsilon = 1e-14);
        assert_relative_eq!(r * Vector3::x(), v.normalize(), epsilon = 1e-14);

        // Degenerate inputs still give a proper rotation
        let r = always_find_rotation(&Vector3::zeros(), &Vector3::zeros(), 1e-20);
        assert_relative_eq!(r, Rotation3::identity());
    }

    #[test]
    fn test_rotation_from_axes() {
        let q = rotation_from_axes(&Vector3::y(), &-Vector3::x(), &Vector3::z());
        assert_relative_eq!(q * Vector3::x(), Vector3::y(), epsilon = 1e-14);
        assert_relative_eq!(q * Vector3::z(), Vector3::z(), epsilon = 1e-14);
    }

    #[test]
    fn test_rotation_vector_rate_matches_finite_difference() {
        let r = Vector3::new(0.4, -0.7, 1.1);
        let omega = Vector3::new(0.3, 0.2, -0.5);
        let h = 1e-6;
        let rotation = UnitQuaternion::from_scaled_axis(r);
        let ahead = (UnitQuaternion::from_scaled_axis(omega * h) * rotation).scaled_axis();
        let behind = (UnitQuaternion::from_scaled_axis(-omega * h) * rotation).scaled_axis();
        let numeric = (ahead - behind) / (2.0 * h);

        assert_relative_eq!(rotation_vector_rate(&r, &omega), numeric, epsilon = 1e-8);
    }

    #[test]
    fn test_rate_conversions_are_inverse() {
        let omega = Vector3::new(0.3, 0.2, -0.5);
        for r in [
            Vector3::zeros(),
            Vector3::new(1e-5, 2e-5, -1e-5),
            Vector3::new(0.4, -0.7, 1.1),
            Vector3::new(-2.0, 1.5, 0.5),
        ] {
            let rate = rotation_vector_rate(&r, &omega);
            assert_relative_eq!(angular_velocity_from_rate(&r, &rate), omega, epsilon = 1e-13);
        }

        // Spinning about the rotation axis only stretches the rotation vector
        let r = Vector3::new(0.0, 0.0, 2.5);
        let omega = Vector3::new(0.0, 0.0, 0.1);
        assert_relative_eq!(rotation_vector_rate(&r, &omega), omega, epsilon = 1e-15);
    }
}
