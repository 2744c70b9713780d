//! Amplitude spectrum of the acceleration history.
//!
//! The analyzer windows the trailing `n_fft` samples, runs a forward FFT
//! and keeps the positive-frequency bins with the DC bin dropped. The
//! dominant frequency is the strongest bin at or above a floor frequency so
//! near-DC leakage never wins.

use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window applied before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpectrumWindow {
    #[default]
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl SpectrumWindow {
    pub fn all() -> &'static [SpectrumWindow] {
        &[
            SpectrumWindow::Hann,
            SpectrumWindow::Hamming,
            SpectrumWindow::Blackman,
            SpectrumWindow::Rectangular,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            SpectrumWindow::Hann => "Hann",
            SpectrumWindow::Hamming => "Hamming",
            SpectrumWindow::Blackman => "Blackman",
            SpectrumWindow::Rectangular => "Rectangular",
        }
    }

    fn coefficient(self, i: usize, n: usize) -> f64 {
        let x = 2.0 * PI * i as f64 / n as f64;
        match self {
            SpectrumWindow::Rectangular => 1.0,
            SpectrumWindow::Hann => 0.5 * (1.0 - x.cos()),
            SpectrumWindow::Hamming => 0.54 - 0.46 * x.cos(),
            // Floating-point representation of the constants can dip a hair
            // below zero at the endpoints.
            SpectrumWindow::Blackman => (0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()).max(0.0),
        }
    }

    pub fn generate(self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.coefficient(i, n)).collect()
    }
}

/// One-sided amplitude spectrum, DC bin excluded.
#[derive(Debug, Clone)]
pub struct SpectrumResult {
    pub frequencies: Vec<f64>,
    pub amplitudes: Vec<f64>,
    /// Hz per bin.
    pub resolution: f64,
}

impl SpectrumResult {
    /// Strongest bin at or above `min_freq`.
    pub fn dominant_frequency(&self, min_freq: f64) -> Option<f64> {
        let start = self.frequencies.iter().position(|&f| f >= min_freq)?;
        let (best, _) = self.frequencies[start..]
            .iter()
            .zip(&self.amplitudes[start..])
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
        Some(*best)
    }

    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        self.frequencies
            .iter()
            .zip(&self.amplitudes)
            .map(|(&f, &a)| [f, a])
            .collect()
    }
}

pub struct SpectrumAnalyzer {
    planner: FftPlanner<f64>,
    n_fft: usize,
    window: SpectrumWindow,
}

impl SpectrumAnalyzer {
    pub fn new(n_fft: usize, window: SpectrumWindow) -> Self {
        Self {
            planner: FftPlanner::new(),
            n_fft,
            window,
        }
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    pub fn window(&self) -> SpectrumWindow {
        self.window
    }

    pub fn set_n_fft(&mut self, n_fft: usize) {
        self.n_fft = n_fft;
    }

    pub fn set_window(&mut self, window: SpectrumWindow) {
        self.window = window;
    }

    /// Returns `None` until at least `n_fft` samples are available.
    pub fn compute(&mut self, samples: &[f64], dt: f64) -> Option<SpectrumResult> {
        if dt <= 0.0 || samples.len() < self.n_fft {
            return None;
        }
        let segment = &samples[samples.len() - self.n_fft..];
        let coeffs = self.window.generate(self.n_fft);

        let mut buffer: Vec<Complex<f64>> = segment
            .iter()
            .zip(&coeffs)
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();

        let fft = self.planner.plan_fft_forward(self.n_fft);
        fft.process(&mut buffer);

        let resolution = 1.0 / (dt * self.n_fft as f64);
        let bins = self.n_fft / 2 + 1;
        let frequencies: Vec<f64> = (1..bins).map(|i| i as f64 * resolution).collect();
        let amplitudes: Vec<f64> = buffer[1..bins].iter().map(|c| c.norm()).collect();

        Some(SpectrumResult {
            frequencies,
            amplitudes,
            resolution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_sine_peak() {
        let dt = 0.005; // 200 Hz sampling
        let freq = 12.5;
        let samples: Vec<f64> = (0..1024)
            .map(|i| (2.0 * PI * freq * i as f64 * dt).sin())
            .collect();
        let mut analyzer = SpectrumAnalyzer::new(512, SpectrumWindow::Hann);
        let result = analyzer.compute(&samples, dt).expect("enough samples");
        let dominant = result.dominant_frequency(0.1).expect("peak exists");
        assert!(
            (dominant - freq).abs() <= result.resolution,
            "dominant {} vs {}",
            dominant,
            freq
        );
    }

    #[test]
    fn needs_full_buffer() {
        let mut analyzer = SpectrumAnalyzer::new(512, SpectrumWindow::Hann);
        assert!(analyzer.compute(&vec![0.0; 511], 0.005).is_none());
        assert!(analyzer.compute(&vec![0.0; 512], 0.005).is_some());
    }

    #[test]
    fn dominant_frequency_respects_floor() {
        let dt = 0.01;
        // Strong slow drift at ~0.2 Hz plus a weaker 8 Hz line; with the
        // floor above the drift the 8 Hz line must win.
        let samples: Vec<f64> = (0..2048)
            .map(|i| {
                let t = i as f64 * dt;
                5.0 * (2.0 * PI * 0.2 * t).sin() + 0.5 * (2.0 * PI * 8.0 * t).sin()
            })
            .collect();
        let mut analyzer = SpectrumAnalyzer::new(1024, SpectrumWindow::Hann);
        let result = analyzer.compute(&samples, dt).unwrap();
        let dominant = result.dominant_frequency(1.0).unwrap();
        assert!((dominant - 8.0).abs() < 0.5, "dominant {}", dominant);
    }

    #[test]
    fn dc_bin_is_excluded() {
        let samples = vec![3.0; 512];
        let mut analyzer = SpectrumAnalyzer::new(512, SpectrumWindow::Rectangular);
        let result = analyzer.compute(&samples, 0.005).unwrap();
        assert!(result.frequencies[0] > 0.0);
        // A constant signal has no energy outside DC.
        let peak = result.amplitudes.iter().cloned().fold(0.0f64, f64::max);
        assert!(peak < 1e-6, "peak {}", peak);
    }

    #[test]
    fn window_endpoints() {
        let hann = SpectrumWindow::Hann.generate(8);
        assert!(hann[0].abs() < 1e-12);
        assert!(hann.iter().all(|&w| (0.0..=1.0).contains(&w)));
        let rect = SpectrumWindow::Rectangular.generate(4);
        assert_eq!(rect, vec![1.0; 4]);
    }
}
