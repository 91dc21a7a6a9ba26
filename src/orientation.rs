//! Accelerometer tilt and gyro-integrated yaw

use crate::math::RAD_TO_DEG;
use crate::types::{Orientation, OrientationSettings, Sample};

/// Orientation estimator
///
/// Pitch and roll come from the direction of gravity in the accelerometer
/// reading and carry no state. Yaw is the running integral of the gyroscope
/// Z rate, so it drifts for as long as the estimator lives. There is no
/// magnetometer correction.
///
/// # Example
/// ```
/// use imu_telemetry::{OrientationEstimator, Sample};
///
/// let mut estimator = OrientationEstimator::new();
/// let turning = Sample::new([0.0, 0.0, 9.81, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0]);
///
/// estimator.update(&turning, 1.0);
/// let orientation = estimator.update(&turning, 1.0);
/// assert!((orientation.yaw - 20.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct OrientationEstimator {
    settings: OrientationSettings,
    /// Integrated heading in degrees
    yaw: f64,
}

impl OrientationEstimator {
    /// Create an estimator with default settings
    pub fn new() -> Self {
        Self::with_settings(OrientationSettings::default())
    }

    pub fn with_settings(settings: OrientationSettings) -> Self {
        Self { settings, yaw: 0.0 }
    }

    /// Estimate orientation from one sample
    ///
    /// # Arguments
    /// * `sample` - SI sample (accelerometer in m/s², gyroscope in deg/s)
    /// * `delta_time` - Seconds since the previous sample
    pub fn update(&mut self, sample: &Sample, delta_time: f64) -> Orientation {
        if self.settings.yaw_integration {
            self.yaw += sample.gyroscope().z * delta_time;
        }

        let (pitch, roll) = tilt(sample);
        Orientation {
            pitch,
            roll,
            yaw: self.yaw,
        }
    }

    /// Current integrated yaw in degrees
    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn settings(&self) -> OrientationSettings {
        self.settings
    }

    /// Zero the integrated yaw
    pub fn reset(&mut self) {
        self.yaw = 0.0;
    }
}

impl Default for OrientationEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Pitch and roll in degrees from the accelerometer alone
///
/// Each angle is zero when its denominator vanishes.
pub fn tilt(sample: &Sample) -> (f64, f64) {
    let accel = sample.accelerometer();

    let horizontal = (accel.y * accel.y + accel.z * accel.z).sqrt();
    let pitch = if horizontal == 0.0 {
        0.0
    } else {
        (-accel.x).atan2(horizontal) * RAD_TO_DEG
    };

    let roll = if accel.z == 0.0 {
        0.0
    } else {
        accel.y.atan2(accel.z) * RAD_TO_DEG
    };

    (pitch, roll)
}
