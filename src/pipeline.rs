//! Per-sample processing pipeline between the acquisition worker and the
//! plots: unit conversion, frame accumulation, the kinematic chain for each
//! axis, bounded plot history and the acceleration spectra.

use std::collections::VecDeque;

use crate::analysis::{SpectrumAnalyzer, SpectrumResult, SpectrumWindow};
use crate::config::{ProcessingConfig, SpectrumConfig};
use crate::dsp::{DspError, KinematicProcessor};
use crate::types::SensorSample;

pub const GRAVITY_MS2: f64 = 9.80665;

pub struct DataProcessor {
    dt: f64,
    frame_size: usize,
    max_points: usize,
    min_frequency: f64,
    axes: [KinematicProcessor; 3],
    /// Samples accumulated toward the next processing frame, per axis.
    pending: [Vec<f64>; 3],
    /// Raw (converted) acceleration kept for the FFT, per axis.
    fft_buffers: [VecDeque<f64>; 3],
    fft_capacity: usize,
    analyzer: SpectrumAnalyzer,
    spectra: [Option<SpectrumResult>; 3],
    dominant: [Option<f64>; 3],
    time: Vec<f64>,
    acc: [Vec<f64>; 3],
    vel: [Vec<f64>; 3],
    disp: [Vec<f64>; 3],
    clock: f64,
}

impl DataProcessor {
    pub fn new(
        dt: f64,
        processing: &ProcessingConfig,
        spectrum: &SpectrumConfig,
        max_points: usize,
    ) -> Result<Self, DspError> {
        let make = || {
            KinematicProcessor::new(
                dt,
                processing.frame_size,
                processing.calc_multiplier,
                processing.rls_q_velocity,
                processing.rls_q_displacement,
                processing.warmup_frames,
            )
        };
        Ok(Self {
            dt,
            frame_size: processing.frame_size,
            max_points,
            min_frequency: spectrum.min_frequency,
            axes: [make()?, make()?, make()?],
            pending: Default::default(),
            fft_buffers: Default::default(),
            fft_capacity: spectrum.n_fft * 2,
            analyzer: SpectrumAnalyzer::new(spectrum.n_fft, spectrum.window),
            spectra: Default::default(),
            dominant: Default::default(),
            time: Vec::new(),
            acc: Default::default(),
            vel: Default::default(),
            disp: Default::default(),
            clock: 0.0,
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn sample_rate_hz(&self) -> f64 {
        1.0 / self.dt
    }

    pub fn is_warmed_up(&self) -> bool {
        self.axes.iter().all(KinematicProcessor::is_warmed_up)
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn acceleration(&self, axis: usize) -> &[f64] {
        &self.acc[axis]
    }

    pub fn velocity(&self, axis: usize) -> &[f64] {
        &self.vel[axis]
    }

    pub fn displacement(&self, axis: usize) -> &[f64] {
        &self.disp[axis]
    }

    pub fn spectrum(&self, axis: usize) -> Option<&SpectrumResult> {
        self.spectra[axis].as_ref()
    }

    pub fn dominant_frequency(&self, axis: usize) -> Option<f64> {
        self.dominant[axis]
    }

    /// Feeds one sample. Acceleration arrives in g and is converted to
    /// m/s^2, with 1 g of gravity removed from the Z axis.
    pub fn ingest(&mut self, sample: &SensorSample) {
        let converted = [
            sample.acc[0] * GRAVITY_MS2,
            sample.acc[1] * GRAVITY_MS2,
            (sample.acc[2] - 1.0) * GRAVITY_MS2,
        ];

        for axis in 0..3 {
            let buf = &mut self.fft_buffers[axis];
            buf.push_back(converted[axis]);
            while buf.len() > self.fft_capacity {
                buf.pop_front();
            }
            self.pending[axis].push(converted[axis]);
        }

        if self.pending[0].len() >= self.frame_size {
            self.process_pending_frame();
        }
    }

    fn process_pending_frame(&mut self) {
        let mut frame_len = 0;
        for axis in 0..3 {
            let frame: Vec<f64> = self.pending[axis].drain(..self.frame_size).collect();
            let out = self.axes[axis].process_frame(&frame);
            frame_len = out.acceleration.len();
            self.acc[axis].extend_from_slice(&out.acceleration);
            self.vel[axis].extend_from_slice(&out.velocity);
            self.disp[axis].extend_from_slice(&out.displacement);
        }

        for i in 0..frame_len {
            self.time.push(self.clock + i as f64 * self.dt);
        }
        self.clock += frame_len as f64 * self.dt;

        self.trim_history();
    }

    fn trim_history(&mut self) {
        let len = self.time.len();
        if len <= self.max_points {
            return;
        }
        let excess = len - self.max_points;
        self.time.drain(..excess);
        for axis in 0..3 {
            self.acc[axis].drain(..excess);
            self.vel[axis].drain(..excess);
            self.disp[axis].drain(..excess);
        }
    }

    /// Recomputes the per-axis acceleration spectra. Axes without a full
    /// FFT buffer keep their previous result.
    pub fn update_spectra(&mut self) {
        for axis in 0..3 {
            let buf = self.fft_buffers[axis].make_contiguous();
            if let Some(result) = self.analyzer.compute(buf, self.dt) {
                self.dominant[axis] = result.dominant_frequency(self.min_frequency);
                self.spectra[axis] = Some(result);
            }
        }
    }

    pub fn set_spectrum_settings(&mut self, n_fft: usize, window: SpectrumWindow) {
        self.analyzer.set_n_fft(n_fft);
        self.analyzer.set_window(window);
        self.fft_capacity = n_fft * 2;
    }

    pub fn set_max_points(&mut self, max_points: usize) {
        self.max_points = max_points.max(1);
        self.trim_history();
    }

    /// Clears all buffers and restarts the plot clock.
    pub fn reset(&mut self) {
        for axis in 0..3 {
            self.axes[axis].reset();
            self.pending[axis].clear();
            self.fft_buffers[axis].clear();
            self.acc[axis].clear();
            self.vel[axis].clear();
            self.disp[axis].clear();
            self.spectra[axis] = None;
            self.dominant[axis] = None;
        }
        self.time.clear();
        self.clock = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorSample;
    use std::f64::consts::PI;

    fn processor(max_points: usize) -> DataProcessor {
        DataProcessor::new(
            0.005,
            &ProcessingConfig::default(),
            &SpectrumConfig::default(),
            max_points,
        )
        .unwrap()
    }

    fn sample(acc: [f64; 3]) -> SensorSample {
        SensorSample::new(acc, [0.0; 3], [0.0; 3], 0)
    }

    #[test]
    fn history_advances_per_frame() {
        let mut proc = processor(2000);
        for _ in 0..19 {
            proc.ingest(&sample([0.0, 0.0, 1.0]));
        }
        assert!(proc.time().is_empty(), "no frame before frame_size samples");
        proc.ingest(&sample([0.0, 0.0, 1.0]));
        assert_eq!(proc.time().len(), 20);
        assert_eq!(proc.acceleration(0).len(), 20);
        assert_eq!(proc.velocity(1).len(), 20);
        assert_eq!(proc.displacement(2).len(), 20);
        // Time axis is a contiguous dt grid.
        assert!((proc.time()[1] - proc.time()[0] - 0.005).abs() < 1e-12);
    }

    #[test]
    fn gravity_is_converted_and_removed() {
        let mut proc = processor(2000);
        for _ in 0..20 {
            proc.ingest(&sample([1.0, 0.5, 1.0]));
        }
        let last = proc.time().len() - 1;
        assert!((proc.acceleration(0)[last] - GRAVITY_MS2).abs() < 1e-9);
        assert!((proc.acceleration(1)[last] - 0.5 * GRAVITY_MS2).abs() < 1e-9);
        // Resting Z reads 1 g on the wire and 0 m/s^2 after conversion.
        assert!(proc.acceleration(2)[last].abs() < 1e-9);
    }

    #[test]
    fn history_is_trimmed_to_max_points() {
        let mut proc = processor(100);
        for _ in 0..500 {
            proc.ingest(&sample([0.1, 0.2, 1.0]));
        }
        assert_eq!(proc.time().len(), 100);
        for axis in 0..3 {
            assert_eq!(proc.acceleration(axis).len(), 100);
            assert_eq!(proc.velocity(axis).len(), 100);
            assert_eq!(proc.displacement(axis).len(), 100);
        }
        // The clock keeps counting even after trimming.
        let expected_end = (500.0 / 20.0) * 20.0 * 0.005 - 0.005;
        assert!((proc.time().last().unwrap() - expected_end).abs() < 1e-9);
    }

    #[test]
    fn spectra_appear_once_buffer_fills() {
        let mut proc = processor(2000);
        proc.update_spectra();
        assert!(proc.spectrum(0).is_none());

        let freq = 5.0;
        for i in 0..600 {
            let t = i as f64 * 0.005;
            let a = (2.0 * PI * freq * t).sin();
            proc.ingest(&sample([a, 0.0, 1.0]));
        }
        proc.update_spectra();
        let spectrum = proc.spectrum(0).expect("512 samples buffered");
        assert!(!spectrum.frequencies.is_empty());
        let dominant = proc.dominant_frequency(0).expect("sine peak");
        assert!((dominant - freq).abs() < 2.0 * spectrum.resolution);
    }

    #[test]
    fn warmup_follows_frame_count() {
        let mut proc = processor(2000);
        assert!(!proc.is_warmed_up());
        for _ in 0..100 {
            proc.ingest(&sample([0.0, 0.0, 1.0]));
        }
        assert!(proc.is_warmed_up());
    }

    #[test]
    fn reset_clears_everything() {
        let mut proc = processor(2000);
        for i in 0..600 {
            let a = (i as f64 * 0.1).sin();
            proc.ingest(&sample([a, a, 1.0]));
        }
        proc.update_spectra();
        proc.reset();
        assert!(proc.time().is_empty());
        assert!(proc.spectrum(0).is_none());
        assert!(proc.dominant_frequency(0).is_none());
        assert!(!proc.is_warmed_up());
        // Clock restarts from zero.
        for _ in 0..20 {
            proc.ingest(&sample([0.0, 0.0, 1.0]));
        }
        assert!((proc.time()[0] - 0.0).abs() < 1e-12);
    }
}
