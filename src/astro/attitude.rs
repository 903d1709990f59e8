use nalgebra::{UnitQuaternion, Vector3};

use super::frame::Frame;
use super::time::{Epoch, TimeInterpolable, TimeShiftable, TimeStamped};
use crate::error::{Error, Result};
use crate::math::geometry::{angular_velocity_from_rate, rotation_vector_rate};
use crate::math::hermite::HermiteInterpolator;

/// Orientation of the spacecraft body axes with respect to a reference frame,
/// at a given date.
///
/// `orientation` is the active rotation taking the reference axes onto the body
/// axes, so `orientation * Vector3::x()` is the body x-axis expressed in the
/// reference frame. `spin` is the angular velocity of the body with respect to
/// the reference frame, also expressed in the reference frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Attitude {
    date: Epoch,
    frame: Frame,
    orientation: UnitQuaternion<f64>,
    spin: Vector3<f64>,
}

impl Attitude {
    pub fn new(
        date: Epoch,
        frame: Frame,
        orientation: UnitQuaternion<f64>,
        spin: Vector3<f64>,
    ) -> Self {
        Attitude {
            date,
            frame,
            orientation,
            spin,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.orientation
    }

    pub fn spin(&self) -> Vector3<f64> {
        self.spin
    }

    /// Expresses a body-frame vector in the reference frame.
    pub fn body_to_reference(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.orientation * v
    }
}

impl TimeStamped for Attitude {
    fn date(&self) -> Epoch {
        self.date
    }
}

impl TimeShiftable for Attitude {
    /// Rotates at constant spin for `dt` seconds.
    fn shifted_by(&self, dt: f64) -> Result<Self> {
        let rotation = UnitQuaternion::from_scaled_axis(self.spin * dt);
        Ok(Attitude {
            date: self.date.shifted_by(dt),
            frame: self.frame.clone(),
            orientation: rotation * self.orientation,
            spin: self.spin,
        })
    }
}

impl TimeInterpolable for Attitude {
    /// Hermite interpolation of the rotation vectors relative to the first
    /// sample. Each spin is turned into the rate of its rotation vector before
    /// fitting, and the interpolated rate back into a spin.
    ///
    /// Samples must share one frame and have pairwise distinct dates, and their
    /// orientations should not be more than half a turn apart.
    fn interpolate(date: Epoch, sample: &[Self]) -> Result<Self> {
        let first = sample.first().ok_or(Error::EmptySample)?;
        let reference = first.orientation;

        let mut interpolator = HermiteInterpolator::<3>::new();
        for attitude in sample {
            if attitude.frame != first.frame {
                return Err(Error::SampleFrameMismatch {
                    expected: first.frame.name().to_owned(),
                    actual: attitude.frame.name().to_owned(),
                });
            }
            let offset = (attitude.orientation * reference.inverse()).scaled_axis();
            let rate = rotation_vector_rate(&offset, &attitude.spin);
            interpolator.add_sample_point(attitude.date - date, &[offset, rate])?;
        }

        let (offset, rate) = interpolator.value_and_derivative(0.0)?;
        Ok(Attitude {
            date,
            frame: first.frame.clone(),
            orientation: UnitQuaternion::from_scaled_axis(offset) * reference,
            spin: angular_velocity_from_rate(&offset, &rate),
        })
    }
}
