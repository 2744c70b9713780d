//! Recursive least squares estimation of a linear trend `y = a*t + b`,
//! used to strip integration drift from velocity and displacement series.

use crate::dsp::DspError;

const INITIAL_P_DIAG: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct RlsDetrender {
    forgetting: f64,
    /// Parameter covariance.
    p: [[f64; 2]; 2],
    /// Estimated [a, b].
    theta: [f64; 2],
}

impl RlsDetrender {
    /// `forgetting` is the forgetting factor; values near 1 weight history
    /// more heavily. Must lie in (0, 1].
    pub fn new(forgetting: f64) -> Result<Self, DspError> {
        if !(forgetting > 0.0 && forgetting <= 1.0) {
            return Err(DspError::InvalidForgettingFactor(forgetting));
        }
        Ok(Self {
            forgetting,
            p: [[INITIAL_P_DIAG, 0.0], [0.0, INITIAL_P_DIAG]],
            theta: [0.0; 2],
        })
    }

    pub fn reset(&mut self) {
        self.p = [[INITIAL_P_DIAG, 0.0], [0.0, INITIAL_P_DIAG]];
        self.theta = [0.0; 2];
    }

    /// Current [slope, intercept] estimate.
    pub fn parameters(&self) -> [f64; 2] {
        self.theta
    }

    /// Runs the RLS update over the batch, then subtracts the trend
    /// evaluated with the final parameter estimate. Stateful across calls.
    pub fn detrend(&mut self, data: &[f64], time: &[f64]) -> Vec<f64> {
        debug_assert_eq!(data.len(), time.len());

        for (&y, &t) in data.iter().zip(time) {
            let phi = [t, 1.0];
            let predicted = self.theta[0] * phi[0] + self.theta[1] * phi[1];
            let err = y - predicted;

            let p_phi = [
                self.p[0][0] * phi[0] + self.p[0][1] * phi[1],
                self.p[1][0] * phi[0] + self.p[1][1] * phi[1],
            ];
            let denom = self.forgetting + phi[0] * p_phi[0] + phi[1] * p_phi[1];
            let gain = if denom != 0.0 {
                [p_phi[0] / denom, p_phi[1] / denom]
            } else {
                [0.0, 0.0]
            };

            self.theta[0] += gain[0] * err;
            self.theta[1] += gain[1] * err;

            let phi_t_p = [
                phi[0] * self.p[0][0] + phi[1] * self.p[1][0],
                phi[0] * self.p[0][1] + phi[1] * self.p[1][1],
            ];
            for r in 0..2 {
                for c in 0..2 {
                    self.p[r][c] = (self.p[r][c] - gain[r] * phi_t_p[c]) / self.forgetting;
                }
            }
        }

        data.iter()
            .zip(time)
            .map(|(&y, &t)| y - (self.theta[0] * t + self.theta[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_forgetting_factor_out_of_range() {
        assert!(RlsDetrender::new(0.0).is_err());
        assert!(RlsDetrender::new(1.1).is_err());
        assert!(RlsDetrender::new(1.0).is_ok());
        assert!(RlsDetrender::new(0.98).is_ok());
    }

    #[test]
    fn removes_pure_linear_trend() {
        let mut filter = RlsDetrender::new(0.9825).unwrap();
        let time: Vec<f64> = (0..500).map(|i| i as f64 * 0.01).collect();
        let data: Vec<f64> = time.iter().map(|t| 3.0 * t - 1.5).collect();
        let detrended = filter.detrend(&data, &time);
        let max_residual = detrended.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(max_residual < 1e-3, "residual {}", max_residual);
        let [a, b] = filter.parameters();
        assert!((a - 3.0).abs() < 1e-3);
        assert!((b + 1.5).abs() < 1e-2);
    }

    #[test]
    fn preserves_oscillation_around_trend() {
        let mut filter = RlsDetrender::new(0.999).unwrap();
        let time: Vec<f64> = (0..1000).map(|i| i as f64 * 0.005).collect();
        let data: Vec<f64> = time
            .iter()
            .map(|t| 0.5 * t + (2.0 * std::f64::consts::PI * 4.0 * t).sin())
            .collect();
        let detrended = filter.detrend(&data, &time);
        // The oscillation should survive detrending with roughly unit amplitude.
        let peak = detrended.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(peak > 0.5 && peak < 1.5, "peak {}", peak);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut filter = RlsDetrender::new(0.9825).unwrap();
        let time: Vec<f64> = (0..100).map(|i| i as f64 * 0.01).collect();
        let data: Vec<f64> = time.iter().map(|t| 2.0 * t).collect();
        filter.detrend(&data, &time);
        assert!(filter.parameters()[0].abs() > 0.1);
        filter.reset();
        assert_eq!(filter.parameters(), [0.0, 0.0]);
    }
}
