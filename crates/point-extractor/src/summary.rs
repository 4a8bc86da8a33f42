//! Descriptive statistics over the retained values of a series.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Count, mean, sample standard deviation, extrema and quartiles.
///
/// Quartiles use linear interpolation between closest ranks. Every field but
/// `count` is `None` for an empty input; `std` is also `None` for a single
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl SummaryStatistics {
    /// Summarise `values`, ignoring NaN entries.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let count = sorted.len();
        if count == 0 {
            return Self::default();
        }
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let sum_sq: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (count - 1) as f64).sqrt()
        });

        Self {
            count,
            mean: Some(mean),
            std,
            min: sorted.first().copied(),
            q25: Some(quantile(&sorted, 0.25)),
            median: Some(quantile(&sorted, 0.5)),
            q75: Some(quantile(&sorted, 0.75)),
            max: sorted.last().copied(),
        }
    }
}

/// Linear-interpolated quantile of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

impl fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<f64>| v.map(|v| format!("{:.6}", v)).unwrap_or_else(|| "NaN".to_string());
        writeln!(f, "count  {}", self.count)?;
        writeln!(f, "mean   {}", show(self.mean))?;
        writeln!(f, "std    {}", show(self.std))?;
        writeln!(f, "min    {}", show(self.min))?;
        writeln!(f, "25%    {}", show(self.q25))?;
        writeln!(f, "50%    {}", show(self.median))?;
        writeln!(f, "75%    {}", show(self.q75))?;
        write!(f, "max    {}", show(self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_semantics() {
        let stats = SummaryStatistics::from_values(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, Some(2.5));
        assert!((stats.std.unwrap() - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.q25, Some(1.75));
        assert_eq!(stats.median, Some(2.5));
        assert_eq!(stats.q75, Some(3.25));
        assert_eq!(stats.max, Some(4.0));
    }

    #[test]
    fn test_single_value_has_no_std() {
        let stats = SummaryStatistics::from_values(&[7.0]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.std, None);
        assert_eq!(stats.median, Some(7.0));
    }

    #[test]
    fn test_empty_and_nan_only() {
        assert_eq!(SummaryStatistics::from_values(&[]), SummaryStatistics::default());
        let stats = SummaryStatistics::from_values(&[f64::NAN]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_none());
    }

    #[test]
    fn test_display_lists_all_rows() {
        let text = SummaryStatistics::from_values(&[1.0, 2.0]).to_string();
        assert!(text.contains("count  2"));
        assert!(text.contains("50%    1.500000"));
    }
}
