//! IMU Telemetry - framed serial ingestion and simple fusion for 9-axis IMUs
//!
//! This library turns a noisy, framed serial text stream from an
//! accelerometer/gyroscope/magnetometer board into calibrated SI samples, then
//! derives pitch/roll/yaw and a dead-reckoned position from them.
//!
//! # Features
//!
//! - Packet framer that resynchronizes on garbled input and bounds its buffer
//! - `$ax ay az gx gy gz [mx my mz];` framed packets and newline-terminated CSV
//! - Raw device units (milli-g, milli-degrees per second) converted to SI
//! - Accelerometer tilt with gyro-integrated yaw
//! - Gravity-compensated double integration with deadzone and velocity damping
//! - Seedable simulation source for running without hardware
//!
//! The estimators are deliberately simple geometric and integration formulas.
//! Yaw is not corrected by the magnetometer and drifts; position drifts unless
//! damping is enabled.
//!
//! # Quick Start
//!
//! ```rust
//! use imu_telemetry::{Orientation, OrientationEstimator, PacketFramer, PositionEstimator, WireFormat};
//!
//! let mut framer = PacketFramer::new(WireFormat::Framed);
//! let mut orientation = OrientationEstimator::new();
//! let mut position = PositionEstimator::new();
//!
//! // Bytes as they arrive from the serial port (milli-g, milli-deg/s)
//! if let Some(sample) = framer.feed(b"$0 0 1000 0 0 500;").into_data() {
//!     let angles: Orientation = orientation.update(&sample, 0.02); // 20ms
//!     let _xyz = position.update(&sample, &angles, 0.02);
//!
//!     println!("pitch {:.1} roll {:.1} yaw {:.2}", angles.pitch, angles.roll, angles.yaw);
//! }
//! ```

pub mod config;
mod error;
pub mod framer;
pub mod math;
mod orientation;
mod position;
pub mod simulation;
pub mod source;
pub mod telemetry;
pub mod transport;
mod types;
pub mod units;

// Re-export the pipeline's public surface
pub use config::Config;
pub use error::{Error, Result};
pub use framer::{FramerStats, PacketError, PacketFramer};
pub use orientation::{OrientationEstimator, tilt};
pub use position::{PhysicsState, PositionEstimator};
pub use simulation::SimulationGenerator;
pub use source::SampleSource;
pub use telemetry::{Telemetry, TelemetryFrame};
pub use transport::{MemoryTransport, SerialTransport, Transport};
pub use types::*;
