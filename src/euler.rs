//! Yaw-pitch-roll angles and the static gravity bootstrap.

use nalgebra::Vector3;

use crate::quaternion::{Quaternion, EPSILON};

/// Euler angles in radians, ZYX intrinsic (yaw about `z`, then pitch about
/// the new `y`, then roll about the new `x`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EulerAngles {
    /// Rotation about the `z` axis, in `(-π, π]`.
    pub yaw: f32,
    /// Rotation about the `y` axis, in `[-π/2, π/2]`.
    pub pitch: f32,
    /// Rotation about the `x` axis, in `(-π, π]`.
    pub roll: f32,
}

impl EulerAngles {
    /// Create a new set of angles.
    #[must_use]
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// The equivalent unit quaternion.
    #[must_use]
    pub fn to_quaternion(self) -> Quaternion {
        Quaternion::from_euler(self)
    }
}

/// `[yaw, pitch, roll]`
impl From<[f32; 3]> for EulerAngles {
    fn from([yaw, pitch, roll]: [f32; 3]) -> Self {
        Self { yaw, pitch, roll }
    }
}

/// `[yaw, pitch, roll]`
impl From<EulerAngles> for [f32; 3] {
    fn from(euler: EulerAngles) -> Self {
        [euler.yaw, euler.pitch, euler.roll]
    }
}

/// Estimate roll and pitch from a single accelerometer reading taken at rest.
///
/// Yaw is unobservable from gravity and is reported as `0`. The reading is
/// interpreted the same way as in [`Mahony::update`](crate::Mahony::update):
/// a level, stationary sensor reads `[0, 0, -g]`.
///
/// This only gives a starting point for the filter, see
/// [`Mahony::from_gravity`](crate::Mahony::from_gravity).
#[must_use]
pub fn orientation_from_gravity(accel: Vector3<f32>) -> (Quaternion, EulerAngles) {
    let norm_squared = accel.norm_squared();
    if norm_squared <= EPSILON * EPSILON {
        log::trace!("accelerometer reading too small for a gravity bootstrap: {accel:?}");
        return (Quaternion::IDENTITY, EulerAngles::default());
    }

    // direction of the support force, i.e. body-frame "up"
    let up = -accel / norm_squared.sqrt();

    let euler = EulerAngles {
        yaw: 0.0,
        pitch: -up.x.atan2((up.y * up.y + up.z * up.z).sqrt()),
        roll: up.y.atan2(up.z),
    };

    (Quaternion::from_euler(euler), euler)
}

#[cfg(test)]
mod tests {
    use core::f32::consts::FRAC_PI_2;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::Vector3;

    use super::*;

    const GRAVITY: f32 = 9.81;

    #[test]
    fn array_conversions_use_yaw_pitch_roll_order() {
        let euler = EulerAngles::from([0.1, 0.2, 0.3]);
        assert_eq!(euler, EulerAngles::new(0.1, 0.2, 0.3));
        assert_eq!(<[f32; 3]>::from(euler), [0.1, 0.2, 0.3]);
    }

    #[test]
    fn level_reading_gives_identity() {
        let (q, euler) = orientation_from_gravity(Vector3::new(0.0, 0.0, -GRAVITY));
        assert_abs_diff_eq!(euler.roll, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(euler.pitch, 0.0, epsilon = 1e-6);
        assert_eq!(euler.yaw, 0.0);
        assert_abs_diff_eq!(q.w, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn bootstrap_predicts_the_measured_gravity() {
        let true_attitude = EulerAngles::new(0.0, 0.4, -0.7).to_quaternion();
        let world_gravity = Vector3::new(0.0, 0.0, -GRAVITY);
        let accel = true_attitude.conjugate().rotate_vector(world_gravity);

        let (q, euler) = orientation_from_gravity(accel);
        assert_relative_eq!(euler.pitch, 0.4, epsilon = 1e-4);
        assert_relative_eq!(euler.roll, -0.7, epsilon = 1e-4);

        let predicted = q.conjugate().rotate_vector(Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(predicted, accel.normalize(), epsilon = 1e-4);
    }

    #[test]
    fn gravity_along_x_saturates_pitch() {
        let (_, euler) = orientation_from_gravity(Vector3::new(-GRAVITY, 0.0, 0.0));
        assert_relative_eq!(euler.pitch, -FRAC_PI_2, epsilon = 1e-5);

        let (_, euler) = orientation_from_gravity(Vector3::new(GRAVITY, 0.0, 0.0));
        assert_relative_eq!(euler.pitch, FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn upside_down_reading_rolls_half_a_turn() {
        let (_, euler) = orientation_from_gravity(Vector3::new(0.0, 0.0, GRAVITY));
        assert_relative_eq!(euler.roll.abs(), core::f32::consts::PI, epsilon = 1e-5);
    }

    #[test]
    fn zero_reading_falls_back_to_identity() {
        let (q, euler) = orientation_from_gravity(Vector3::zeros());
        assert_eq!(q, Quaternion::IDENTITY);
        assert_eq!(euler, EulerAngles::default());
    }
}
