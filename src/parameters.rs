//! Tunable parameters of the [`Mahony`](crate::Mahony) filter.

use core::time::Duration;

use nalgebra::Vector3;
use thiserror::Error;

/// Reasons a [`MahonyParameters`] set is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParameterError {
    /// The sample rate must be finite and strictly positive.
    #[error("sample rate must be finite and positive, got {0} Hz")]
    InvalidSampleRate(f32),
}

/// Parameters for the [`Mahony`](crate::Mahony) filter.
///
/// The gains are only meaningful for the sample rate they were tuned at: the
/// filter assumes it is updated exactly once every [`Self::sample_period`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MahonyParameters {
    /// Proportional gain $k_P$ applied to the gravity alignment error.
    ///
    /// Larger values trust the accelerometer more and converge faster, at
    /// the cost of passing more linear acceleration through to the estimate.
    pub kp: f32,
    /// Integral gain $k_I$ applied to the accumulated alignment error.
    ///
    /// The integral term acts as a gyroscope bias estimate for the two axes
    /// observable from gravity.
    pub ki: f32,
    /// Bound for each component of the accumulated error (anti-windup).
    ///
    /// The sign is ignored.
    pub integral_limit: f32,
    /// Fixed update frequency in Hz.
    pub sample_rate: f32,
    /// Constant gyroscope offset in rad/s, subtracted from every sample.
    pub gyro_bias: Vector3<f32>,
}

impl Default for MahonyParameters {
    fn default() -> Self {
        Self {
            kp: 0.6,
            ki: 0.0,
            integral_limit: 0.0,
            sample_rate: 1000.0,
            gyro_bias: Vector3::zeros(),
        }
    }
}

impl MahonyParameters {
    /// Check the parameters for values the filter cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::InvalidSampleRate`] if `sample_rate` is not a
    /// finite, positive number.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ParameterError::InvalidSampleRate(self.sample_rate));
        }

        Ok(())
    }

    /// Integration time step in seconds, `1 / sample_rate`.
    #[must_use]
    pub fn dt(&self) -> f32 {
        1.0 / self.sample_rate
    }

    /// The update period as a [`Duration`].
    ///
    /// Saturates to [`Duration::ZERO`] for parameters that do not pass
    /// [`Self::validate`].
    #[must_use]
    pub fn sample_period(&self) -> Duration {
        Duration::try_from_secs_f32(self.dt()).unwrap_or(Duration::ZERO)
    }
}
