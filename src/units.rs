//! Raw device unit to SI conversion
//!
//! Devices report acceleration in milli-g and angular rate in milli-degrees per
//! second. The magnetometer already reports Gauss and passes through unchanged.

use nalgebra::Vector3;

use crate::types::Sample;

/// Standard gravity (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// milli-g to m/s²
pub const MG_TO_MS2: f64 = STANDARD_GRAVITY / 1000.0;

/// milli-degrees per second to degrees per second
pub const MDPS_TO_DPS: f64 = 1.0 / 1000.0;

/// Converts a raw 9-field record into an SI [`Sample`]
///
/// Only the first six fields are scaled.
///
/// # Example
/// ```
/// use imu_telemetry::units::to_si;
///
/// let sample = to_si([0.0, 0.0, 1000.0, 0.0, 0.0, 2000.0, 0.5, 0.0, -0.5]);
/// assert!((sample.accelerometer().z - 9.80665).abs() < 1e-12);
/// assert!((sample.gyroscope().z - 2.0).abs() < 1e-12);
/// assert_eq!(sample.magnetometer().x, 0.5);
/// ```
pub fn to_si(raw: [f64; Sample::LEN]) -> Sample {
    let accel = accelerometer_to_si(Vector3::new(raw[0], raw[1], raw[2]));
    let gyro = gyroscope_to_si(Vector3::new(raw[3], raw[4], raw[5]));

    Sample::new([
        accel.x, accel.y, accel.z, gyro.x, gyro.y, gyro.z, raw[6], raw[7], raw[8],
    ])
}

/// Converts an accelerometer reading from milli-g to m/s²
pub fn accelerometer_to_si(milli_g: Vector3<f64>) -> Vector3<f64> {
    milli_g * MG_TO_MS2
}

/// Converts a gyroscope reading from milli-degrees per second to deg/s
pub fn gyroscope_to_si(milli_dps: Vector3<f64>) -> Vector3<f64> {
    milli_dps * MDPS_TO_DPS
}
