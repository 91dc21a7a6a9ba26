//! Synthetic samples of a level, stationary board

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64;

use crate::types::{Sample, SimulationSettings};
use crate::units;

/// Raw accelerometer Z reading of a level board (milli-g)
const ONE_G_MILLI: f64 = 1000.0;

/// Simulation sample generator
///
/// Produces Gaussian noise around a board lying level and still, pointing
/// north: accelerometer ≈ (0, 0, 1 g), gyroscope ≈ 0, magnetometer ≈ the
/// configured field vector. Noise is drawn in raw device units and converted
/// like live data.
///
/// # Example
/// ```
/// use imu_telemetry::{SimulationGenerator, SimulationSettings};
///
/// let mut generator = SimulationGenerator::new(SimulationSettings {
///     seed: Some(7),
///     ..Default::default()
/// });
///
/// let sample = generator.next_sample();
/// assert!((sample.accelerometer().z - 9.80665).abs() < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationGenerator {
    settings: SimulationSettings,
    rng: Pcg64,
    /// Simulated seconds since construction
    time: f64,
}

impl SimulationGenerator {
    pub fn new(settings: SimulationSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_rng(&mut rand::rng()),
        };
        Self {
            settings,
            rng,
            time: 0.0,
        }
    }

    /// Produce the next sample; always succeeds
    pub fn next_sample(&mut self) -> Sample {
        self.time += self.settings.time_step;

        let accel_noise = self.settings.accelerometer_noise;
        let gyro_noise = self.settings.gyroscope_noise;
        let mag_noise = self.settings.magnetometer_noise;
        let field = self.settings.magnetic_field;

        units::to_si([
            self.gaussian(0.0, accel_noise),
            self.gaussian(0.0, accel_noise),
            self.gaussian(ONE_G_MILLI, accel_noise),
            self.gaussian(0.0, gyro_noise),
            self.gaussian(0.0, gyro_noise),
            self.gaussian(0.0, gyro_noise),
            self.gaussian(field[0], mag_noise),
            self.gaussian(field[1], mag_noise),
            self.gaussian(field[2], mag_noise),
        ])
    }

    /// Simulated seconds elapsed
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn settings(&self) -> SimulationSettings {
        self.settings
    }

    fn gaussian(&mut self, mean: f64, stddev: f64) -> f64 {
        if stddev == 0.0 {
            return mean;
        }
        let n: f64 = self.rng.sample(StandardNormal);
        mean + n * stddev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SimulationGenerator {
        SimulationGenerator::new(SimulationSettings {
            seed: Some(seed),
            ..Default::default()
        })
    }

    #[test]
    fn test_deterministic_seed() {
        let mut a = seeded(42);
        let mut b = seeded(42);

        for _ in 0..100 {
            assert_eq!(a.next_sample(), b.next_sample());
        }
    }

    #[test]
    fn test_noiseless_board_is_exact() {
        let mut generator = SimulationGenerator::new(SimulationSettings {
            accelerometer_noise: 0.0,
            gyroscope_noise: 0.0,
            magnetometer_noise: 0.0,
            seed: Some(1),
            ..Default::default()
        });

        let sample = generator.next_sample();
        assert_eq!(
            sample.values(),
            &[0.0, 0.0, units::STANDARD_GRAVITY, 0.0, 0.0, 0.0, 0.5, 0.0, -0.5]
        );
    }

    #[test]
    fn test_mean_matches_stationary_board() {
        let mut generator = seeded(3);
        let count = 5000;

        let mut sum = [0.0; Sample::LEN];
        for _ in 0..count {
            for (total, value) in sum.iter_mut().zip(generator.next_sample().values()) {
                *total += value;
            }
        }
        let mean: Vec<f64> = sum.iter().map(|total| total / count as f64).collect();

        // σ/√n is about 0.0014 m/s² for the accelerometer at 10 mg
        assert!(mean[0].abs() < 0.01);
        assert!(mean[1].abs() < 0.01);
        assert!((mean[2] - units::STANDARD_GRAVITY).abs() < 0.01);
        for gyro in &mean[3..6] {
            assert!(gyro.abs() < 0.005);
        }
        assert!((mean[6] - 0.5).abs() < 0.005);
        assert!(mean[7].abs() < 0.005);
        assert!((mean[8] + 0.5).abs() < 0.005);
    }

    #[test]
    fn test_time_advances_per_sample() {
        let mut generator = seeded(9);
        for _ in 0..50 {
            generator.next_sample();
        }
        assert!((generator.time() - 1.0).abs() < 1e-9);
    }
}
