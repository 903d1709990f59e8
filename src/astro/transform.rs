use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

use super::pv::PVCoordinates;
use super::time::{Epoch, TimeStamped};

/// Kinematic transform from a source frame to a target frame that may be
/// moving and rotating with respect to it, valid at one date.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    date: Epoch,
    /// Takes source coordinates to target coordinates
    isometry: Isometry3<f64>,
    /// Velocity of the target origin, in source coordinates
    relative_velocity: Vector3<f64>,
    /// Angular velocity of the target axes, in source coordinates
    angular_velocity: Vector3<f64>,
}

impl Transform {
    /// Transform towards the frame obtained by applying `rotation`, then
    /// `translation`, to the source axes.
    pub fn from_active(
        date: Epoch,
        rotation: UnitQuaternion<f64>,
        translation: Vector3<f64>,
        relative_velocity: Vector3<f64>,
        angular_velocity: Vector3<f64>,
    ) -> Self {
        // active to passive
        let active_isometry = Isometry3::from_parts(Translation3::from(translation), rotation);
        Transform {
            date,
            isometry: active_isometry.inverse(),
            relative_velocity,
            angular_velocity,
        }
    }

    pub fn identity(date: Epoch) -> Self {
        Transform {
            date,
            isometry: Isometry3::identity(),
            relative_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }

    pub fn inverse(&self) -> Self {
        // The source origin is at rest in the source frame, so its velocity in the
        // target frame is just a velocity conversion.
        let relative_velocity = self.convert_velocity(&Point3::origin(), &Vector3::zeros());
        let angular_velocity = -self.convert_vector(&self.angular_velocity);

        Transform {
            date: self.date,
            isometry: self.isometry.inverse(),
            relative_velocity,
            angular_velocity,
        }
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.isometry.rotation
    }

    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    pub fn convert_point(&self, pt: &Point3<f64>) -> Point3<f64> {
        self.isometry.transform_point(pt)
    }

    pub fn inverse_convert_point(&self, pt: &Point3<f64>) -> Point3<f64> {
        self.isometry.inverse_transform_point(pt)
    }

    /// Ignores the displacement between the two origins.
    pub fn convert_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.isometry.transform_vector(vector)
    }

    pub fn inverse_convert_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.isometry.inverse_transform_vector(vector)
    }

    /// Velocity of an object seen from the target frame, given its position
    /// and velocity in source coordinates.
    pub fn convert_velocity(&self, position: &Point3<f64>, velocity: &Vector3<f64>) -> Vector3<f64> {
        let rb_src = position - self.inverse_convert_point(&Point3::origin());
        let vb_src = velocity - self.relative_velocity - self.angular_velocity.cross(&rb_src);
        self.convert_vector(&vb_src)
    }

    pub fn transform_pv(&self, pv: &PVCoordinates) -> PVCoordinates {
        let position = Point3::from(pv.position);
        PVCoordinates::new(
            self.convert_point(&position).coords,
            self.convert_velocity(&position, &pv.velocity),
        )
    }
}

impl TimeStamped for Transform {
    fn date(&self) -> Epoch {
        self.date
    }
}
