//! Core types and conventions for the telemetry pipeline

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Sample source mode
///
/// Selects whether samples come from the serial device or from the
/// synthetic noise generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Synthetic samples of a level, stationary board
    #[default]
    Simulation,
    /// Samples decoded from the serial byte stream
    Live,
}

/// Wire format of the serial text stream
///
/// # Formats
/// - **Framed**: `$ax ay az gx gy gz [mx my mz];`
/// - **Csv**: `ax,ay,az,gx,gy,gz[,mx,my,mz]` terminated by a newline
///
/// Both carry raw device units (milli-g, milli-degrees per second, Gauss).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// `$`-started, `;`-terminated, space separated packets
    #[default]
    Framed,
    /// Newline-terminated, comma separated lines
    Csv,
}

/// One calibrated 9-axis reading in SI units
///
/// Layout is `[ax, ay, az, gx, gy, gz, mx, my, mz]`:
/// accelerometer in m/s², gyroscope in deg/s, magnetometer in Gauss.
/// A 6-axis reading has its magnetometer fields set to zero.
///
/// # Example
/// ```
/// use imu_telemetry::Sample;
///
/// let sample = Sample::new([0.0, 0.0, 9.81, 0.0, 0.0, 1.5, 0.5, 0.0, -0.5]);
/// assert_eq!(sample.accelerometer().z, 9.81);
/// assert_eq!(sample.gyroscope().z, 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample([f64; Sample::LEN]);

impl Sample {
    /// Number of values in a sample
    pub const LEN: usize = 9;

    pub fn new(values: [f64; Self::LEN]) -> Self {
        Self(values)
    }

    /// All nine values in wire order
    pub fn values(&self) -> &[f64; Self::LEN] {
        &self.0
    }

    /// Accelerometer reading in m/s²
    pub fn accelerometer(&self) -> Vector3<f64> {
        Vector3::new(self.0[0], self.0[1], self.0[2])
    }

    /// Gyroscope reading in deg/s
    pub fn gyroscope(&self) -> Vector3<f64> {
        Vector3::new(self.0[3], self.0[4], self.0[5])
    }

    /// Magnetometer reading in Gauss
    pub fn magnetometer(&self) -> Vector3<f64> {
        Vector3::new(self.0[6], self.0[7], self.0[8])
    }
}

impl From<Sample> for [f64; Sample::LEN] {
    fn from(sample: Sample) -> Self {
        sample.0
    }
}

/// Pitch, roll and yaw in degrees
///
/// Pitch and roll are accelerometer tilt angles recomputed for every sample.
/// Yaw is the uncorrected integral of the gyroscope Z rate: it drifts without
/// bound and the magnetometer is never used to correct it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Rotation about the lateral axis (degrees)
    pub pitch: f64,
    /// Rotation about the longitudinal axis (degrees)
    pub roll: f64,
    /// Gyro-integrated heading (degrees), drift-prone
    pub yaw: f64,
}

/// Outcome of one ingestion step
///
/// Distinguishes "nothing complete yet" from "garbage received" and from a
/// failing transport, so callers do not have to inspect logs.
///
/// # Example
/// ```
/// use imu_telemetry::{Ingest, PacketFramer, WireFormat};
///
/// let mut framer = PacketFramer::new(WireFormat::Framed);
/// assert!(matches!(framer.feed(b"$1 2 3"), Ingest::NoData));
/// let sample = framer.feed(b" 4 5 6;").into_data().unwrap();
/// assert_eq!(sample.gyroscope().z, 0.006);
/// ```
#[derive(Debug)]
pub enum Ingest<T> {
    /// A value was produced this step
    Data(T),
    /// No complete packet was available
    NoData,
    /// Only undecodable packets were completed this step
    Malformed,
    /// The transport failed while reading
    TransportError(Error),
}

impl<T> Ingest<T> {
    /// The produced value, if any
    pub fn into_data(self) -> Option<T> {
        match self {
            Ingest::Data(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Ingest::Data(_))
    }

    /// Transform the produced value, keeping every other outcome
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Ingest<U> {
        match self {
            Ingest::Data(value) => Ingest::Data(f(value)),
            Ingest::NoData => Ingest::NoData,
            Ingest::Malformed => Ingest::Malformed,
            Ingest::TransportError(e) => Ingest::TransportError(e),
        }
    }
}

/// Whether the requested sample source mode was honored at startup
///
/// A failed serial open downgrades Live to Simulation exactly once, when the
/// source is constructed. The mode never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// The requested mode is in effect
    Honored(Mode),
    /// Live was requested but the port could not be opened
    Downgraded {
        /// Why the serial port could not be opened
        reason: String,
    },
}

impl ConnectionOutcome {
    /// The mode actually in effect
    pub fn effective_mode(&self) -> Mode {
        match self {
            ConnectionOutcome::Honored(mode) => *mode,
            ConnectionOutcome::Downgraded { .. } => Mode::Simulation,
        }
    }

    pub fn is_downgraded(&self) -> bool {
        matches!(self, ConnectionOutcome::Downgraded { .. })
    }
}

/// Orientation estimator settings
#[derive(Debug, Clone, Copy)]
pub struct OrientationSettings {
    /// Whether the gyroscope Z rate is integrated into yaw
    ///
    /// When disabled yaw stays at zero.
    pub yaw_integration: bool,
}

impl Default for OrientationSettings {
    fn default() -> Self {
        Self {
            yaw_integration: true,
        }
    }
}

/// Position estimator settings
///
/// # Example
/// ```
/// use imu_telemetry::PositionSettings;
///
/// let settings = PositionSettings {
///     acceleration_deadzone: 0.2,  // m/s²
///     damping: None,               // let velocity drift freely
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PositionSettings {
    /// Gravity subtracted from the world-frame Z axis (m/s²)
    pub gravity: f64,
    /// World-frame axes with a smaller magnitude are zeroed (m/s²)
    pub acceleration_deadzone: f64,
    /// Per-step velocity decay factor, `None` to disable damping
    ///
    /// Bounds velocity growth from residual bias at the cost of an
    /// artificial deceleration toward rest.
    pub damping: Option<f64>,
}

impl Default for PositionSettings {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            acceleration_deadzone: 0.1,
            damping: Some(0.95),
        }
    }
}

/// Simulation generator settings
///
/// Noise is expressed in raw device units and goes through the same unit
/// conversion as live data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Accelerometer noise standard deviation (milli-g)
    pub accelerometer_noise: f64,
    /// Gyroscope noise standard deviation (milli-degrees per second)
    pub gyroscope_noise: f64,
    /// Magnetometer noise standard deviation (Gauss)
    pub magnetometer_noise: f64,
    /// Field vector of a board pointing north (Gauss)
    pub magnetic_field: [f64; 3],
    /// Simulated time advanced per sample (seconds)
    pub time_step: f64,
    /// RNG seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            accelerometer_noise: 10.0,
            gyroscope_noise: 50.0,
            magnetometer_noise: 0.01,
            magnetic_field: [0.5, 0.0, -0.5],
            time_step: 0.02,
            seed: None,
        }
    }
}
