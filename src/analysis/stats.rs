//! Descriptive statistics over recorded series snapshots.

/// Summary metrics for one series. Standard deviation and variance are the
/// population forms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub variance: f64,
}

pub fn describe(series: &[f64]) -> Option<SeriesStats> {
    if series.is_empty() {
        return None;
    }
    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    Some(SeriesStats {
        mean,
        median,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        variance,
    })
}

/// Pearson correlation matrix. Series are truncated to the shortest length;
/// a constant series correlates as 0 with everything and 1 with itself.
pub fn correlation_matrix(series: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = series.len();
    if k == 0 {
        return Vec::new();
    }
    let n = series.iter().map(|s| s.len()).min().unwrap_or(0);
    if n == 0 {
        return vec![vec![0.0; k]; k];
    }

    let means: Vec<f64> = series
        .iter()
        .map(|s| s[..n].iter().sum::<f64>() / n as f64)
        .collect();
    let sds: Vec<f64> = series
        .iter()
        .zip(&means)
        .map(|(s, &m)| {
            (s[..n].iter().map(|v| (v - m) * (v - m)).sum::<f64>() / n as f64).sqrt()
        })
        .collect();

    let mut matrix = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in 0..k {
            if i == j {
                matrix[i][j] = 1.0;
                continue;
            }
            if sds[i] == 0.0 || sds[j] == 0.0 {
                continue;
            }
            let cov = (0..n)
                .map(|t| (series[i][t] - means[i]) * (series[j][t] - means[j]))
                .sum::<f64>()
                / n as f64;
            matrix[i][j] = cov / (sds[i] * sds[j]);
        }
    }
    matrix
}

/// Histogram counts with evenly spaced bin edges (`bins + 1` edges). A
/// degenerate range is widened by half a unit on each side so every sample
/// still lands in a bin.
pub fn histogram(series: &[f64], bins: usize) -> (Vec<usize>, Vec<f64>) {
    if series.is_empty() || bins == 0 {
        return (Vec::new(), Vec::new());
    }
    let mut lo = series.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut hi = series.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();
    let mut counts = vec![0usize; bins];
    for &v in series {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    (counts, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_basic_series() {
        let stats = describe(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!((stats.variance - 1.25).abs() < 1e-12);
        assert!((stats.std_dev - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn describe_odd_length_median() {
        let stats = describe(&[5.0, 1.0, 3.0]).unwrap();
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn describe_empty_is_none() {
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn correlation_of_identical_and_inverted() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b: Vec<f64> = a.iter().map(|v| -v).collect();
        let m = correlation_matrix(&[a.clone(), a.clone(), b]);
        assert!((m[0][1] - 1.0).abs() < 1e-12);
        assert!((m[0][2] + 1.0).abs() < 1e-12);
        assert_eq!(m[2][2], 1.0);
    }

    #[test]
    fn correlation_with_constant_series() {
        let m = correlation_matrix(&[vec![1.0, 2.0, 3.0], vec![5.0, 5.0, 5.0]]);
        assert_eq!(m[0][1], 0.0);
        assert_eq!(m[1][1], 1.0);
    }

    #[test]
    fn histogram_counts_everything() {
        let data: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let (counts, edges) = histogram(&data, 10);
        assert_eq!(counts.len(), 10);
        assert_eq!(edges.len(), 11);
        assert_eq!(counts.iter().sum::<usize>(), 100);
        assert_eq!(counts, vec![10; 10]);
    }

    #[test]
    fn histogram_degenerate_range() {
        let (counts, edges) = histogram(&[2.0; 7], 4);
        assert_eq!(counts.iter().sum::<usize>(), 7);
        assert!(edges[0] < 2.0 && edges[4] > 2.0);
    }
}
