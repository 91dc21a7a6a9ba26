//! Pipeline configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::types::{Mode, OrientationSettings, PositionSettings, SimulationSettings, WireFormat};

/// Startup configuration
///
/// Built once and handed to [`Telemetry`](crate::Telemetry), which never
/// mutates it. Missing TOML keys fall back to the defaults below.
///
/// # Example
/// ```
/// use imu_telemetry::{Config, Mode};
///
/// let config = Config::from_toml_str(r#"
///     mode = "live"
///     port = "/dev/ttyUSB0"
///     acceleration_deadzone = 0.25
///
///     [simulation]
///     seed = 42
/// "#).unwrap();
///
/// assert_eq!(config.mode, Mode::Live);
/// assert_eq!(config.baud, 115_200);
/// assert_eq!(config.simulation.seed, Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Requested sample source
    pub mode: Mode,
    /// Serial port path
    pub port: String,
    /// Serial baud rate
    pub baud: u32,
    /// Upper bound on a single serial read (milliseconds)
    pub read_timeout_ms: u64,
    /// Text format sent by the device
    pub wire_format: WireFormat,
    /// Integrate gyroscope Z into yaw
    pub yaw_integration: bool,
    /// Decay velocity every step
    pub position_damping: bool,
    /// Per-step velocity decay factor when damping is enabled
    pub damping_factor: f64,
    /// World-frame accelerations below this are ignored (m/s²)
    pub acceleration_deadzone: f64,
    /// Simulation generator settings
    pub simulation: SimulationSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Simulation,
            port: "/dev/ttyACM0".to_owned(),
            baud: 115_200,
            read_timeout_ms: 100,
            wire_format: WireFormat::Framed,
            yaw_integration: true,
            position_damping: true,
            damping_factor: 0.95,
            acceleration_deadzone: 0.1,
            simulation: SimulationSettings::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!(?path, "Loaded config");
        Ok(config)
    }

    pub fn orientation_settings(&self) -> OrientationSettings {
        OrientationSettings {
            yaw_integration: self.yaw_integration,
        }
    }

    pub fn position_settings(&self) -> PositionSettings {
        PositionSettings {
            acceleration_deadzone: self.acceleration_deadzone,
            damping: self.position_damping.then_some(self.damping_factor),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_full_document() {
        let config = Config::from_toml_str(
            r#"
            mode = "live"
            port = "COM3"
            baud = 921600
            read_timeout_ms = 20
            wire_format = "csv"
            yaw_integration = false
            position_damping = false
            damping_factor = 0.9
            acceleration_deadzone = 0.5

            [simulation]
            accelerometer_noise = 0.0
            magnetic_field = [0.2, 0.0, -0.4]
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, Mode::Live);
        assert_eq!(config.port, "COM3");
        assert_eq!(config.baud, 921_600);
        assert_eq!(config.wire_format, WireFormat::Csv);
        assert!(!config.orientation_settings().yaw_integration);
        assert_eq!(config.position_settings().damping, None);
        assert_eq!(config.position_settings().acceleration_deadzone, 0.5);
        assert_eq!(config.simulation.accelerometer_noise, 0.0);
        assert_eq!(config.simulation.gyroscope_noise, 50.0);
        assert_eq!(config.simulation.magnetic_field, [0.2, 0.0, -0.4]);
    }

    #[test]
    fn test_damping_factor_used_when_enabled() {
        let config = Config {
            damping_factor: 0.8,
            ..Default::default()
        };
        assert_eq!(config.position_settings().damping, Some(0.8));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Config::from_toml_str(r#"mode = "replay""#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "baud = 57600").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.baud, 57_600);
        assert_eq!(config.mode, Mode::Simulation);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Config::load("/nonexistent/imu-telemetry.toml").is_err());
    }
}
