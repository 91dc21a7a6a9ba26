//! Per-poll ingestion and fusion pipeline

use std::time::Instant;

use nalgebra::{Isometry3, Vector3};

use crate::config::Config;
use crate::math::rigid_body_transform;
use crate::orientation::OrientationEstimator;
use crate::position::PositionEstimator;
use crate::source::SampleSource;
use crate::types::{ConnectionOutcome, Ingest, Mode, Orientation, Sample};

/// Everything produced by one successful poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryFrame {
    /// Calibrated SI sample
    pub sample: Sample,
    /// Tilt angles and gyro-integrated yaw (degrees)
    pub orientation: Orientation,
    /// Dead-reckoned position (m)
    pub position: Vector3<f64>,
    /// Seconds since the previous sample
    pub delta_time: f64,
}

impl TelemetryFrame {
    /// Pose of the rendered board: translate by position, then rotate by yaw,
    /// pitch and roll about the world axes
    pub fn body_transform(&self) -> Isometry3<f64> {
        rigid_body_transform(self.position, &self.orientation)
    }
}

/// Telemetry pipeline
///
/// Owns the sample source and both estimators. An external scheduler calls
/// [`poll`](Self::poll) at a fixed cadence; nothing here blocks or spawns
/// threads.
///
/// # Example
/// ```
/// use imu_telemetry::{Config, ConnectionOutcome, Mode, Telemetry};
///
/// let (mut telemetry, outcome) = Telemetry::new(Config::default());
/// assert_eq!(outcome, ConnectionOutcome::Honored(Mode::Simulation));
///
/// // Simulation produces a frame on every poll
/// let frame = telemetry.step(0.02).into_data().unwrap();
/// assert!(frame.orientation.pitch.abs() < 5.0);
/// ```
pub struct Telemetry {
    config: Config,
    source: SampleSource,
    orientation: OrientationEstimator,
    position: PositionEstimator,
    last_sample: Instant,
}

impl Telemetry {
    /// Build the pipeline, opening the configured source
    ///
    /// The returned outcome reports whether Live mode had to fall back to
    /// Simulation.
    pub fn new(config: Config) -> (Self, ConnectionOutcome) {
        let (source, outcome) = SampleSource::open(&config);
        (Self::with_source(config, source), outcome)
    }

    /// Build the pipeline around an already constructed source
    pub fn with_source(config: Config, source: SampleSource) -> Self {
        Self {
            orientation: OrientationEstimator::with_settings(config.orientation_settings()),
            position: PositionEstimator::with_settings(config.position_settings()),
            config,
            source,
            last_sample: Instant::now(),
        }
    }

    /// Run one ingestion step using wall-clock time since the previous sample
    pub fn poll(&mut self) -> Ingest<TelemetryFrame> {
        let now = Instant::now();
        let last_sample = self.last_sample;
        let outcome = self.source.poll();
        if outcome.is_data() {
            self.last_sample = now;
        }
        outcome.map(|sample| self.fuse(sample, now.duration_since(last_sample).as_secs_f64()))
    }

    /// Run one ingestion step with a caller-supplied `delta_time` in seconds
    pub fn step(&mut self, delta_time: f64) -> Ingest<TelemetryFrame> {
        let outcome = self.source.poll();
        if outcome.is_data() {
            self.last_sample = Instant::now();
        }
        outcome.map(|sample| self.fuse(sample, delta_time))
    }

    fn fuse(&mut self, sample: Sample, delta_time: f64) -> TelemetryFrame {
        let orientation = self.orientation.update(&sample, delta_time);
        let position = self.position.update(&sample, &orientation, delta_time);
        TelemetryFrame {
            sample,
            orientation,
            position,
            delta_time,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mode in effect after any startup downgrade
    pub fn mode(&self) -> Mode {
        self.source.mode()
    }

    pub fn source(&self) -> &SampleSource {
        &self.source
    }

    pub fn orientation_estimator(&self) -> &OrientationEstimator {
        &self.orientation
    }

    pub fn position_estimator(&self) -> &PositionEstimator {
        &self.position
    }

    /// Zero yaw, velocity and position and restart the sample clock
    pub fn reset(&mut self) {
        self.orientation.reset();
        self.position.reset();
        self.last_sample = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use crate::types::WireFormat;

    fn live(config: Config) -> (Telemetry, MemoryTransport) {
        let transport = MemoryTransport::new();
        let source = SampleSource::live(Box::new(transport.clone()), WireFormat::Framed);
        (Telemetry::with_source(config, source), transport)
    }

    #[test]
    fn test_no_data_leaves_estimators_untouched() {
        let (mut telemetry, _transport) = live(Config::default());

        assert!(matches!(telemetry.step(1.0), Ingest::NoData));
        assert_eq!(telemetry.orientation_estimator().yaw(), 0.0);
        assert_eq!(telemetry.position_estimator().position(), Vector3::zeros());
    }

    #[test]
    fn test_step_fuses_sample() {
        let (mut telemetry, transport) = live(Config::default());

        // 10 deg/s about Z on a level board
        transport.inject(b"$0 0 1000 0 0 10000;");
        let frame = telemetry.step(0.5).into_data().unwrap();

        assert!((frame.orientation.yaw - 5.0).abs() < 1e-9);
        assert!(frame.orientation.pitch.abs() < 1e-9);
        assert_eq!(frame.delta_time, 0.5);
    }

    #[test]
    fn test_poll_measures_elapsed_time() {
        let (mut telemetry, transport) = live(Config::default());

        transport.inject(b"$0 0 1000 0 0 0;");
        let frame = telemetry.poll().into_data().unwrap();
        assert!(frame.delta_time >= 0.0);
        assert!(frame.delta_time < 5.0);
    }

    #[test]
    fn test_reset() {
        let (mut telemetry, transport) = live(Config::default());

        transport.inject(b"$500 0 1000 0 0 10000;");
        telemetry.step(1.0);
        assert!(telemetry.orientation_estimator().yaw() != 0.0);

        telemetry.reset();
        assert_eq!(telemetry.orientation_estimator().yaw(), 0.0);
        assert_eq!(telemetry.position_estimator().velocity(), Vector3::zeros());
    }
}
