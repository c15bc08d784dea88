//! Robust price statistics with quartile-based outlier rejection.
//!
//! Quartiles use inclusive linear interpolation: the `p`-quantile of a sorted
//! sample of `n` values sits at position `(n - 1) * p`, interpolating between
//! the neighbouring values. Prices outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]` are
//! rejected. All reported figures are floored to whole currency units.

use crate::error::{CatalogError, Result};
use crate::models::PriceStatistics;

/// Fence multiplier applied to the interquartile range.
pub const IQR_FENCE: f64 = 1.5;

fn sorted(prices: &[f64]) -> Vec<f64> {
    let mut v = prices.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

/// Quantile of an ascending, non-empty sample.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * p;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// First and third quartiles of an ascending, non-empty sample.
pub fn quartiles(sorted: &[f64]) -> (f64, f64) {
    (quantile(sorted, 0.25), quantile(sorted, 0.75))
}

/// Median of an ascending, non-empty sample (mean of the middle pair when even).
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Remove IQR outliers from an ascending sample.
///
/// Samples of fewer than two values are returned as-is, and so is the whole
/// sample when the fences would reject every value.
pub fn trim_outliers(sorted: &[f64]) -> Vec<f64> {
    if sorted.len() < 2 {
        return sorted.to_vec();
    }
    let (q1, q3) = quartiles(sorted);
    let iqr = q3 - q1;
    let (low, high) = (q1 - IQR_FENCE * iqr, q3 + IQR_FENCE * iqr);
    let kept: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|p| (low..=high).contains(p))
        .collect();
    if kept.is_empty() {
        sorted.to_vec()
    } else {
        kept
    }
}

/// Compute [`PriceStatistics`] for one group.
///
/// Non-positive prices are ignored. The result does not depend on the order of
/// `prices`. Fails with [`CatalogError::EmptyPriceSet`] when no positive price
/// remains.
pub fn estimate(group_key: &str, prices: &[f64]) -> Result<PriceStatistics> {
    let positive: Vec<f64> = prices.iter().copied().filter(|p| *p > 0.0).collect();
    if positive.is_empty() {
        return Err(CatalogError::EmptyPriceSet(group_key.to_string()));
    }

    let trimmed = trim_outliers(&sorted(&positive));
    let exact_median = median(&trimmed);
    let mean = trimmed.iter().sum::<f64>() / trimmed.len() as f64;

    Ok(PriceStatistics {
        median: exact_median.floor() as i64,
        min: trimmed[0].floor() as i64,
        max: trimmed[trimmed.len() - 1].floor() as i64,
        mean: mean.floor() as i64,
        transaction_count: trimmed.len(),
        exact_median,
        trimmed_prices: trimmed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quartiles_interpolate_inclusively() {
        let s = [9800.0, 10000.0, 10500.0, 11000.0, 50000.0];
        assert_eq!(quartiles(&s), (10000.0, 11000.0));

        let s = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quartiles(&s), (1.75, 3.25));
    }

    #[test]
    fn median_of_even_sample_averages_middle_pair() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[7.0]), 7.0);
    }

    #[test]
    fn trim_keeps_single_value_samples() {
        assert_eq!(trim_outliers(&[500.0]), vec![500.0]);
    }

    #[test]
    fn trim_never_rejects_everything_on_flat_samples() {
        let flat = [3000.0, 3000.0, 3000.0];
        assert_eq!(trim_outliers(&flat), flat.to_vec());
    }

    #[test]
    fn estimate_ignores_non_positive_prices() {
        let stats = estimate("k", &[0.0, -5.0, 2000.0, 4000.0]).unwrap();
        assert_eq!(stats.transaction_count, 2);
        assert_eq!(stats.median, 3000);
        assert_eq!(stats.min, 2000);
        assert_eq!(stats.max, 4000);
    }

    #[test]
    fn estimate_floors_fractional_results() {
        let stats = estimate("k", &[1000.0, 1001.0]).unwrap();
        assert_eq!(stats.exact_median, 1000.5);
        assert_eq!(stats.median, 1000);
        assert_eq!(stats.mean, 1000);
    }

    #[test]
    fn estimate_rejects_groups_without_positive_prices() {
        let err = estimate("Jimin|PROOF|general", &[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyPriceSet(k) if k == "Jimin|PROOF|general"));
    }
}
