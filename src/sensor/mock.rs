//! Simulated IMU for development without hardware. Each channel is a sine
//! wave with additive uniform noise; the Z acceleration carries the 1 g
//! gravity offset a real sensor reports at rest.

use std::f64::consts::PI;

use chrono::Utc;
use rand::Rng;

use crate::types::SensorSample;

const ACC_FREQS_HZ: [f64; 3] = [2.0, 3.0, 5.0];
const ACC_AMPS_G: [f64; 3] = [1.0, 0.8, 1.2];
const GYRO_FREQS_HZ: [f64; 3] = [1.0, 1.5, 0.7];
const GYRO_AMPS_DPS: [f64; 3] = [20.0, 15.0, 10.0];
const ANGLE_FREQS_HZ: [f64; 3] = [0.5, 0.3, 0.2];
const ANGLE_AMPS_DEG: [f64; 3] = [5.0, 10.0, 15.0];

const NOISE_LEVEL: f64 = 0.05;

#[derive(Debug)]
pub struct MockSignalSource {
    time: f64,
    dt: f64,
}

impl MockSignalSource {
    pub fn new(dt: f64) -> Self {
        Self { time: 0.0, dt }
    }

    /// Sampling interval in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn next_sample(&mut self) -> SensorSample {
        let mut rng = rand::rng();
        let mut channel = |freqs: &[f64; 3], amps: &[f64; 3]| {
            let mut out = [0.0; 3];
            for i in 0..3 {
                let value = amps[i] * (2.0 * PI * freqs[i] * self.time).sin();
                let noise = NOISE_LEVEL * amps[i] * rng.random_range(-0.5..0.5);
                out[i] = value + noise;
            }
            out
        };

        let mut acc = channel(&ACC_FREQS_HZ, &ACC_AMPS_G);
        acc[2] += 1.0; // gravity
        let gyro = channel(&GYRO_FREQS_HZ, &GYRO_AMPS_DPS);
        let angle = channel(&ANGLE_FREQS_HZ, &ANGLE_AMPS_DEG);

        self.time += self.dt;
        SensorSample::new(acc, gyro, angle, Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_axis_carries_gravity_offset() {
        let mut source = MockSignalSource::new(0.005);
        let n = 2000;
        let mean_z: f64 = (0..n).map(|_| source.next_sample().acc[2]).sum::<f64>() / n as f64;
        // 5 Hz sine averages out over 10 s; the 1 g offset remains.
        assert!((mean_z - 1.0).abs() < 0.1, "mean z was {}", mean_z);
    }

    #[test]
    fn time_advances_by_dt() {
        let mut source = MockSignalSource::new(0.01);
        for _ in 0..10 {
            source.next_sample();
        }
        assert!((source.time - 0.1).abs() < 1e-12);
    }

    #[test]
    fn amplitudes_stay_in_band() {
        let mut source = MockSignalSource::new(0.005);
        for _ in 0..1000 {
            let s = source.next_sample();
            assert!(s.acc[0].abs() <= ACC_AMPS_G[0] * (1.0 + NOISE_LEVEL));
            assert!(s.gyro[0].abs() <= GYRO_AMPS_DPS[0] * (1.0 + NOISE_LEVEL));
            assert!(s.angle[2].abs() <= ANGLE_AMPS_DEG[2] * (1.0 + NOISE_LEVEL));
        }
    }
}
