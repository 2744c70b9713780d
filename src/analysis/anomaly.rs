//! Anomaly screening used by the analysis tab.

/// A flagged sample: its index in the source series and the value that
/// triggered the detector (for sudden changes, the step magnitude).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyPoint {
    pub index: usize,
    pub value: f64,
}

/// Samples whose z-score magnitude exceeds `threshold`. A constant series
/// has no outliers.
pub fn zscore_outliers(series: &[f64], threshold: f64) -> Vec<AnomalyPoint> {
    if series.is_empty() {
        return Vec::new();
    }
    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let std = (series.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt();
    if std == 0.0 {
        return Vec::new();
    }
    series
        .iter()
        .enumerate()
        .filter(|(_, &v)| ((v - mean) / std).abs() > threshold)
        .map(|(index, &value)| AnomalyPoint { index, value })
        .collect()
}

/// Samples falling outside a band of `threshold` standard deviations around
/// the trailing moving average of `window` samples.
pub fn moving_average_anomalies(
    series: &[f64],
    window: usize,
    threshold: f64,
) -> Vec<AnomalyPoint> {
    if window == 0 || series.len() < window {
        return Vec::new();
    }
    let mut out = Vec::new();
    for end in window..=series.len() {
        let segment = &series[end - window..end];
        let mean = segment.iter().sum::<f64>() / window as f64;
        let std =
            (segment.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / window as f64).sqrt();
        let idx = end - 1;
        let value = series[idx];
        if value > mean + threshold * std || value < mean - threshold * std {
            out.push(AnomalyPoint { index: idx, value });
        }
    }
    out
}

/// First differences whose magnitude exceeds `threshold`. The index refers
/// to the sample before the jump; the value is the signed difference.
pub fn sudden_changes(series: &[f64], threshold: f64) -> Vec<AnomalyPoint> {
    series
        .windows(2)
        .enumerate()
        .filter_map(|(index, pair)| {
            let diff = pair[1] - pair[0];
            (diff.abs() > threshold).then_some(AnomalyPoint { index, value: diff })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zscore_flags_spike() {
        let mut series = vec![0.0; 100];
        series[40] = 50.0;
        let outliers = zscore_outliers(&series, 3.0);
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].index, 40);
        assert_eq!(outliers[0].value, 50.0);
    }

    #[test]
    fn zscore_constant_series_is_clean() {
        assert!(zscore_outliers(&[7.0; 50], 3.0).is_empty());
        assert!(zscore_outliers(&[], 3.0).is_empty());
    }

    #[test]
    fn moving_average_flags_step() {
        let mut series = vec![1.0; 60];
        for v in series.iter_mut().skip(50) {
            *v = 10.0;
        }
        let anomalies = moving_average_anomalies(&series, 20, 2.0);
        assert!(anomalies.iter().any(|a| a.index == 50));
    }

    #[test]
    fn moving_average_short_series_is_clean() {
        assert!(moving_average_anomalies(&[1.0, 2.0], 20, 2.0).is_empty());
    }

    #[test]
    fn sudden_change_reports_signed_step() {
        let series = [0.0, 0.1, 5.0, 5.1, 0.2];
        let changes = sudden_changes(&series, 2.0);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].index, 1);
        assert!((changes[0].value - 4.9).abs() < 1e-12);
        assert!((changes[1].value + 4.9).abs() < 1e-12);
    }
}
