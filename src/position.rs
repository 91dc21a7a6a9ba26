//! Dead-reckoned position from gravity-compensated acceleration

use nalgebra::Vector3;

use crate::math::{Vector3Ext, body_to_world};
use crate::types::{Orientation, PositionSettings, Sample};

/// Velocity and position integrated by a [`PositionEstimator`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsState {
    /// World-frame velocity (m/s)
    pub velocity: Vector3<f64>,
    /// World-frame position (m)
    pub position: Vector3<f64>,
    /// Total integrated time (s)
    pub elapsed: f64,
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self {
            velocity: Vector3::zeros(),
            position: Vector3::zeros(),
            elapsed: 0.0,
        }
    }
}

/// Position estimator
///
/// Rotates each accelerometer reading into the world frame, removes gravity,
/// suppresses small accelerations, then Euler-integrates twice. Without an
/// external position reference the estimate drifts; damping trades that drift
/// for an artificial pull toward rest.
///
/// # Example
/// ```
/// use imu_telemetry::{Orientation, PositionEstimator, PositionSettings, Sample};
///
/// let mut estimator = PositionEstimator::with_settings(PositionSettings {
///     damping: None,
///     ..Default::default()
/// });
///
/// // 1 m/s² forward on a level board
/// let sample = Sample::new([1.0, 0.0, 9.81, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
/// let position = estimator.update(&sample, &Orientation::default(), 1.0);
///
/// assert!((position.x - 1.0).abs() < 1e-9);
/// assert!((estimator.state().velocity.x - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct PositionEstimator {
    settings: PositionSettings,
    state: PhysicsState,
}

impl PositionEstimator {
    /// Create an estimator with default settings
    pub fn new() -> Self {
        Self::with_settings(PositionSettings::default())
    }

    pub fn with_settings(settings: PositionSettings) -> Self {
        Self {
            settings,
            state: PhysicsState::default(),
        }
    }

    /// Integrate one sample and return the updated position
    ///
    /// # Arguments
    /// * `sample` - SI sample; only the accelerometer is used
    /// * `orientation` - Orientation of the board for this sample
    /// * `delta_time` - Seconds since the previous sample
    pub fn update(
        &mut self,
        sample: &Sample,
        orientation: &Orientation,
        delta_time: f64,
    ) -> Vector3<f64> {
        let acceleration = self.linear_acceleration(sample, orientation);

        self.state.velocity += acceleration * delta_time;
        if let Some(factor) = self.settings.damping {
            self.state.velocity *= factor;
        }
        self.state.position += self.state.velocity * delta_time;
        self.state.elapsed += delta_time;

        self.state.position
    }

    /// World-frame acceleration with gravity removed and the deadzone applied
    pub fn linear_acceleration(&self, sample: &Sample, orientation: &Orientation) -> Vector3<f64> {
        let mut world = body_to_world(orientation) * sample.accelerometer();
        world.z -= self.settings.gravity;
        world.deadzone(self.settings.acceleration_deadzone)
    }

    pub fn position(&self) -> Vector3<f64> {
        self.state.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.state.velocity
    }

    pub fn state(&self) -> PhysicsState {
        self.state
    }

    pub fn settings(&self) -> PositionSettings {
        self.settings
    }

    /// Zero velocity and position
    pub fn reset(&mut self) {
        self.state = PhysicsState::default();
    }
}

impl Default for PositionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn accel(x: f64, y: f64, z: f64) -> Sample {
        Sample::new([x, y, z, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    fn undamped(deadzone: f64) -> PositionEstimator {
        PositionEstimator::with_settings(PositionSettings {
            acceleration_deadzone: deadzone,
            damping: None,
            ..Default::default()
        })
    }

    #[test]
    fn test_gravity_removed_at_rest() {
        let estimator = undamped(0.0);
        let linear = estimator.linear_acceleration(&accel(0.0, 0.0, 9.81), &Orientation::default());
        assert!(linear.magnitude() < EPSILON);
    }

    #[test]
    fn test_acceleration_rotated_by_yaw() {
        let estimator = undamped(0.0);
        let orientation = Orientation {
            yaw: 90.0,
            ..Default::default()
        };
        let linear = estimator.linear_acceleration(&accel(2.0, 0.0, 9.81), &orientation);
        assert!((linear - Vector3::new(0.0, 2.0, 0.0)).magnitude() < EPSILON);
    }

    #[test]
    fn test_double_integration() {
        let mut estimator = undamped(0.0);
        let sample = accel(0.0, 0.0, 11.81);

        // v: 0.2, 0.4 ; p: 0.02, 0.06
        estimator.update(&sample, &Orientation::default(), 0.1);
        let position = estimator.update(&sample, &Orientation::default(), 0.1);

        assert!((estimator.velocity().z - 0.4).abs() < EPSILON);
        assert!((position.z - 0.06).abs() < EPSILON);
        assert!((estimator.state().elapsed - 0.2).abs() < EPSILON);
    }

    #[test]
    fn test_damping_applied_before_position() {
        let mut estimator = PositionEstimator::with_settings(PositionSettings {
            acceleration_deadzone: 0.0,
            damping: Some(0.5),
            ..Default::default()
        });

        let position = estimator.update(&accel(4.0, 0.0, 9.81), &Orientation::default(), 1.0);
        assert!((estimator.velocity().x - 2.0).abs() < EPSILON);
        assert!((position.x - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_reset() {
        let mut estimator = undamped(0.0);
        estimator.update(&accel(3.0, 0.0, 9.81), &Orientation::default(), 1.0);
        assert!(estimator.position().magnitude() > 0.0);

        estimator.reset();
        assert_eq!(estimator.state(), PhysicsState::default());
    }
}
