//! Mathematical utilities and nalgebra extensions for the telemetry pipeline

use nalgebra::{Isometry3, Rotation3, Translation3, Vector3};

use crate::types::Orientation;

/// Mathematical constants
pub const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
pub const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Zero every component whose magnitude is below `threshold`
    fn deadzone(&self, threshold: f64) -> Vector3<f64>;

    /// Convert degrees to radians
    fn deg_to_rad(&self) -> Vector3<f64>;
}

impl Vector3Ext for Vector3<f64> {
    fn deadzone(&self, threshold: f64) -> Vector3<f64> {
        self.map(|v| if v.abs() < threshold { 0.0 } else { v })
    }

    fn deg_to_rad(&self) -> Vector3<f64> {
        *self * DEG_TO_RAD
    }
}

/// Body-to-world rotation for an orientation
///
/// Composed yaw, then pitch, then roll: yaw about world Z, pitch about the
/// resulting Y axis, roll about the resulting X axis.
pub fn body_to_world(orientation: &Orientation) -> Rotation3<f64> {
    let angles = euler_radians(orientation);
    Rotation3::from_euler_angles(angles.x, angles.y, angles.z)
}

/// Rigid-body transform of a rendered board
///
/// Translates by `position`, then rotates by yaw, pitch and roll about the
/// fixed world axes, in that order.
pub fn rigid_body_transform(position: Vector3<f64>, orientation: &Orientation) -> Isometry3<f64> {
    let angles = euler_radians(orientation);
    let yaw = Rotation3::from_axis_angle(&Vector3::z_axis(), angles.z);
    let pitch = Rotation3::from_axis_angle(&Vector3::y_axis(), angles.y);
    let roll = Rotation3::from_axis_angle(&Vector3::x_axis(), angles.x);

    // Rotations about fixed axes compose by left multiplication
    let rotation = roll * pitch * yaw;
    Isometry3::from_parts(Translation3::from(rotation * position), rotation.into())
}

/// Roll, pitch and yaw as an (x, y, z) vector in radians
fn euler_radians(orientation: &Orientation) -> Vector3<f64> {
    Vector3::new(orientation.roll, orientation.pitch, orientation.yaw).deg_to_rad()
}
