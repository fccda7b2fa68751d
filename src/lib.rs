//! Attitude estimation for fixed-rate IMU control loops.
//!
//! The crate provides a small [`Quaternion`] algebra and a [`Mahony`]
//! nonlinear complementary filter that fuses gyroscope integration with the
//! gravity direction measured by an accelerometer. There is no absolute yaw
//! reference: yaw follows the integrated gyroscope and drifts with its bias.
//!
//! ```rust
//! use mahony_ahrs::{Mahony, MahonyParameters};
//! use nalgebra::Vector3;
//!
//! let mut filter = Mahony::new(MahonyParameters::default()).unwrap();
//!
//! // one tick of a level sensor at rest
//! filter.update(Vector3::zeros(), Vector3::new(0.0, 0.0, -9.81));
//!
//! let euler = filter.euler();
//! assert!(euler.roll.abs() < 1e-4 && euler.pitch.abs() < 1e-4);
//! ```

mod euler;
mod parameters;
pub mod quaternion;
mod sample;
mod shared;

use nalgebra::Vector3;

pub use euler::{orientation_from_gravity, EulerAngles};
pub use parameters::{MahonyParameters, ParameterError};
pub use quaternion::Quaternion;
pub use sample::ImuSample;
pub use shared::{AttitudeSnapshot, SharedOrientation};

use quaternion::EPSILON;

/// Direction of gravity in the world frame.
const WORLD_GRAVITY: Vector3<f32> = Vector3::new(0.0, 0.0, -1.0);

/// Mutable state of a [`Mahony`] filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MahonyState {
    /// Current orientation estimate, rotating body-frame vectors into the
    /// world frame.
    pub orientation: Quaternion,
    /// Accumulated alignment error, one component per body axis, each
    /// bounded by [`MahonyParameters::integral_limit`].
    pub integral_error: Vector3<f32>,
}

impl Default for MahonyState {
    fn default() -> Self {
        Self {
            orientation: Quaternion::IDENTITY,
            integral_error: Vector3::zeros(),
        }
    }
}

/// The Mahony attitude filter.
///
/// # Timing
///
/// [`Mahony::update`] integrates over a fixed step of
/// [`MahonyParameters::dt`]. It must be called exactly once per sample period;
/// irregular calls are not detected and silently distort the estimate.
#[derive(Debug, Clone)]
pub struct Mahony {
    /// The parameters of the filter.
    parameters: MahonyParameters,
    /// Cached `1 / sample_rate`.
    dt: f32,
    /// The state of the filter.
    state: MahonyState,
}

impl Mahony {
    /// Create a new filter at the identity orientation.
    ///
    /// # Errors
    ///
    /// Fails if the parameters do not pass [`MahonyParameters::validate`].
    pub fn new(parameters: MahonyParameters) -> Result<Self, ParameterError> {
        parameters.validate()?;

        log::debug!(
            "mahony filter: kp={} ki={} integral_limit={} at {} Hz",
            parameters.kp,
            parameters.ki,
            parameters.integral_limit,
            parameters.sample_rate
        );

        Ok(Self {
            dt: parameters.dt(),
            parameters,
            state: MahonyState::default(),
        })
    }

    /// Create a new filter whose roll and pitch are taken from a static
    /// accelerometer reading, see [`orientation_from_gravity`].
    ///
    /// Starting close to the true attitude avoids the multi-second transient
    /// of converging from the identity after power-on.
    ///
    /// # Errors
    ///
    /// Fails if the parameters do not pass [`MahonyParameters::validate`].
    pub fn from_gravity(
        parameters: MahonyParameters,
        accel: Vector3<f32>,
    ) -> Result<Self, ParameterError> {
        let mut filter = Self::new(parameters)?;
        let (orientation, euler) = orientation_from_gravity(accel);
        log::debug!(
            "mahony filter: bootstrapped from gravity, roll={} pitch={}",
            euler.roll,
            euler.pitch
        );

        filter.state.orientation = orientation;
        Ok(filter)
    }

    /// Alignment error between the gravity direction predicted by the current
    /// orientation and the one measured by `accel`.
    ///
    /// The magnitude is the sine of the angle between the two directions. The
    /// direction is the body-frame rotation axis that, applied as an angular
    /// rate, turns the prediction toward the measurement.
    ///
    /// An `accel` too short to normalize is used as is, which makes the
    /// error correspondingly small and unreliable for that tick.
    #[must_use]
    pub fn gravity_error(&self, accel: Vector3<f32>) -> Vector3<f32> {
        let norm_squared = accel.norm_squared();
        let measured = if norm_squared > EPSILON * EPSILON {
            accel / norm_squared.sqrt()
        } else {
            log::trace!("accelerometer sample too small to normalize: {accel:?}");
            accel
        };

        // gravity as the body should currently be seeing it
        let expected = self
            .state
            .orientation
            .conjugate()
            .rotate_vector(WORLD_GRAVITY);

        measured.cross(&expected)
    }

    /// Update step of the filter, using the gyroscope reading in rad/s and
    /// the accelerometer reading in m/s^2.
    pub fn update(&mut self, gyro: Vector3<f32>, accel: Vector3<f32>) {
        let error = self.gravity_error(accel);

        // anti-windup
        let limit = self.parameters.integral_limit.abs();
        self.state.integral_error = (self.state.integral_error + error)
            .map(|component| component.max(-limit).min(limit));

        let corrected = gyro - self.parameters.gyro_bias
            + error * self.parameters.kp
            + self.state.integral_error * self.parameters.ki;

        // forward Euler integration of q' = 1/2 q ⊗ ω
        let q_dot = self.state.orientation.derivative(corrected);
        self.state.orientation += q_dot * self.dt;

        if !self.state.orientation.normalize() {
            log::warn!("mahony filter: orientation collapsed, reset to identity");
        }
    }

    /// Update step of the filter from a driver sample.
    pub fn update_sample(&mut self, sample: &ImuSample) {
        self.update(sample.gyro, sample.accel);
    }

    /// Returns the current orientation estimate.
    #[must_use]
    pub fn orientation(&self) -> Quaternion {
        self.state.orientation
    }

    /// Returns the current orientation as yaw, pitch and roll.
    #[must_use]
    pub fn euler(&self) -> EulerAngles {
        self.state.orientation.to_euler()
    }

    /// Returns the accumulated, clamped alignment error.
    #[must_use]
    pub fn integral_error(&self) -> Vector3<f32> {
        self.state.integral_error
    }

    /// Returns the full filter state.
    #[must_use]
    pub fn state(&self) -> &MahonyState {
        &self.state
    }

    /// Returns the parameters the filter was created with.
    #[must_use]
    pub fn parameters(&self) -> &MahonyParameters {
        &self.parameters
    }

    /// Copy the current orientation into `shared` for readers in other
    /// execution contexts.
    pub fn publish(&self, shared: &SharedOrientation) {
        shared.publish(self.state.orientation);
    }
}
