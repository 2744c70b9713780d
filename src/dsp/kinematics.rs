//! Acceleration to velocity to displacement, one axis per processor.
//!
//! Each incoming frame is shifted into a long sliding buffer; the whole
//! buffer is re-integrated and RLS-detrended on every frame so the trend
//! estimate sees enough history, and only the newest frame-sized slice is
//! returned. Early frames are unreliable until the filters have warmed up.

use log::warn;

use crate::dsp::integrator::TrapezoidIntegrator;
use crate::dsp::rls::RlsDetrender;
use crate::dsp::DspError;

/// Per-frame output of the kinematic chain.
#[derive(Debug, Clone)]
pub struct KinematicFrame {
    pub displacement: Vec<f64>,
    pub velocity: Vec<f64>,
    pub acceleration: Vec<f64>,
}

#[derive(Debug)]
pub struct KinematicProcessor {
    frame_size: usize,
    warmup_frames: usize,
    frames_processed: usize,
    acc_buffer: Vec<f64>,
    time_axis: Vec<f64>,
    integrator: TrapezoidIntegrator,
    velocity_filter: RlsDetrender,
    displacement_filter: RlsDetrender,
}

impl KinematicProcessor {
    pub fn new(
        dt: f64,
        frame_size: usize,
        calc_multiplier: usize,
        q_velocity: f64,
        q_displacement: f64,
        warmup_frames: usize,
    ) -> Result<Self, DspError> {
        if frame_size == 0 || calc_multiplier == 0 {
            return Err(DspError::EmptyBuffer);
        }
        let calc_size = frame_size * calc_multiplier;
        Ok(Self {
            frame_size,
            warmup_frames,
            frames_processed: 0,
            acc_buffer: vec![0.0; calc_size],
            time_axis: (0..calc_size).map(|i| i as f64 * dt).collect(),
            integrator: TrapezoidIntegrator::new(dt)?,
            velocity_filter: RlsDetrender::new(q_velocity)?,
            displacement_filter: RlsDetrender::new(q_displacement)?,
        })
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Results are unreliable until enough frames have passed through the
    /// drift filters.
    pub fn is_warmed_up(&self) -> bool {
        self.frames_processed >= self.warmup_frames
    }

    pub fn reset(&mut self) {
        self.acc_buffer.fill(0.0);
        self.velocity_filter.reset();
        self.displacement_filter.reset();
        self.frames_processed = 0;
    }

    /// Processes one frame of acceleration samples and returns the matching
    /// displacement/velocity/acceleration slice. Short frames are padded
    /// with their last value, long ones truncated, so the buffer always
    /// advances by exactly `frame_size`.
    pub fn process_frame(&mut self, frame: &[f64]) -> KinematicFrame {
        if frame.is_empty() {
            warn!("Received empty acceleration frame");
            return KinematicFrame {
                displacement: vec![f64::NAN; self.frame_size],
                velocity: vec![f64::NAN; self.frame_size],
                acceleration: vec![f64::NAN; self.frame_size],
            };
        }

        let mut normalized = vec![0.0; self.frame_size];
        if frame.len() >= self.frame_size {
            if frame.len() > self.frame_size {
                warn!(
                    "Frame length {} exceeds frame size {}, truncating",
                    frame.len(),
                    self.frame_size
                );
            }
            normalized.copy_from_slice(&frame[..self.frame_size]);
        } else {
            warn!(
                "Frame length {} below frame size {}, padding with last value",
                frame.len(),
                self.frame_size
            );
            normalized[..frame.len()].copy_from_slice(frame);
            normalized[frame.len()..].fill(frame[frame.len() - 1]);
        }

        self.frames_processed += 1;

        // Shift the sliding buffer left by one frame and append the new one.
        let calc_size = self.acc_buffer.len();
        self.acc_buffer.copy_within(self.frame_size.., 0);
        self.acc_buffer[calc_size - self.frame_size..].copy_from_slice(&normalized);

        let raw_velocity = self.integrator.integrate(&self.acc_buffer);
        let velocity = self.velocity_filter.detrend(&raw_velocity, &self.time_axis);

        let raw_displacement = self.integrator.integrate(&velocity);
        let displacement = self
            .displacement_filter
            .detrend(&raw_displacement, &self.time_axis);

        let tail = calc_size - self.frame_size;
        KinematicFrame {
            displacement: displacement[tail..].to_vec(),
            velocity: velocity[tail..].to_vec(),
            acceleration: self.acc_buffer[tail..].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn processor() -> KinematicProcessor {
        KinematicProcessor::new(0.005, 20, 100, 0.9825, 0.9825, 5).unwrap()
    }

    #[test]
    fn warmup_counts_frames() {
        let mut proc = processor();
        assert!(!proc.is_warmed_up());
        for _ in 0..5 {
            proc.process_frame(&[0.0; 20]);
        }
        assert!(proc.is_warmed_up());
        proc.reset();
        assert!(!proc.is_warmed_up());
    }

    #[test]
    fn empty_frame_yields_nan() {
        let mut proc = processor();
        let out = proc.process_frame(&[]);
        assert_eq!(out.displacement.len(), 20);
        assert!(out.displacement.iter().all(|v| v.is_nan()));
        assert!(out.velocity.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn output_matches_frame_size() {
        let mut proc = processor();
        // Short and long frames both normalize to frame_size.
        let short = proc.process_frame(&[1.0; 7]);
        assert_eq!(short.acceleration.len(), 20);
        assert_eq!(short.acceleration[19], 1.0);
        let long = proc.process_frame(&vec![2.0; 35]);
        assert_eq!(long.velocity.len(), 20);
    }

    #[test]
    fn zero_input_stays_zero() {
        let mut proc = processor();
        for _ in 0..10 {
            let out = proc.process_frame(&[0.0; 20]);
            assert!(out.displacement.iter().all(|v| v.abs() < 1e-12));
            assert!(out.velocity.iter().all(|v| v.abs() < 1e-12));
        }
    }

    #[test]
    fn sinusoid_displacement_is_bounded_after_warmup() {
        // a(t) = A sin(wt) integrates to displacement -A/w^2 sin(wt); the
        // drift filters must keep the result bounded near that amplitude.
        let dt = 0.005;
        let freq = 2.0;
        let omega = 2.0 * PI * freq;
        let amp = 1.0;
        let mut proc = processor();
        let mut t = 0.0;
        let mut peak = 0.0f64;
        for frame_idx in 0..200 {
            let frame: Vec<f64> = (0..20)
                .map(|i| amp * (omega * (t + i as f64 * dt)).sin())
                .collect();
            t += 20.0 * dt;
            let out = proc.process_frame(&frame);
            if frame_idx >= 50 {
                for v in &out.displacement {
                    peak = peak.max(v.abs());
                }
            }
        }
        let expected = amp / (omega * omega);
        assert!(
            peak < expected * 10.0,
            "displacement drifted: peak {} vs expected {}",
            peak,
            expected
        );
        assert!(peak > expected * 0.1, "displacement vanished: peak {}", peak);
    }
}
