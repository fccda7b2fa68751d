//! Raw inertial samples as delivered by the sensor driver.

use nalgebra::Vector3;

/// One reading of a 6-DOF IMU, already converted to physical units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImuSample {
    /// Angular rate in the body frame, rad/s.
    pub gyro: Vector3<f32>,
    /// Acceleration in the body frame, m/s^2. A level sensor at rest reads
    /// `[0, 0, -g]`.
    pub accel: Vector3<f32>,
    /// Die temperature in °C, if the driver reports one.
    pub temperature: Option<f32>,
}

impl ImuSample {
    /// A sample without a temperature reading.
    #[must_use]
    pub fn new(gyro: Vector3<f32>, accel: Vector3<f32>) -> Self {
        Self {
            gyro,
            accel,
            temperature: None,
        }
    }

    /// Attach a temperature reading.
    #[must_use]
    pub fn with_temperature(self, temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..self
        }
    }
}
