use crate::dsp::DspError;

/// Cumulative trapezoidal integration with a fixed sampling interval.
/// The integrated series starts at zero.
#[derive(Debug, Clone, Copy)]
pub struct TrapezoidIntegrator {
    dt: f64,
}

impl TrapezoidIntegrator {
    pub fn new(dt: f64) -> Result<Self, DspError> {
        if dt <= 0.0 || !dt.is_finite() {
            return Err(DspError::NonPositiveDt(dt));
        }
        Ok(Self { dt })
    }

    pub fn integrate(&self, series: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; series.len()];
        for i in 1..series.len() {
            out[i] = out[i - 1] + (series[i - 1] + series[i]) * self.dt / 2.0;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_dt() {
        assert!(TrapezoidIntegrator::new(0.0).is_err());
        assert!(TrapezoidIntegrator::new(-0.1).is_err());
        assert!(TrapezoidIntegrator::new(0.01).is_ok());
    }

    #[test]
    fn integrates_constant_to_ramp() {
        let integrator = TrapezoidIntegrator::new(0.5).unwrap();
        let out = integrator.integrate(&[2.0, 2.0, 2.0, 2.0]);
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn integrates_ramp_to_quadratic() {
        let dt = 0.01;
        let integrator = TrapezoidIntegrator::new(dt).unwrap();
        let n = 1000;
        let ramp: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
        let out = integrator.integrate(&ramp);
        // Trapezoidal rule is exact for linear input: t^2 / 2.
        let t_end = (n - 1) as f64 * dt;
        assert!((out[n - 1] - t_end * t_end / 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let integrator = TrapezoidIntegrator::new(0.01).unwrap();
        assert!(integrator.integrate(&[]).is_empty());
    }
}
