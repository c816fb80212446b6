//! Null-aware summary statistics shared by every calculator.
//!
//! Absent samples are skipped, never coerced to zero - an all-null series
//! produces a zeroed summary that still reports its counts. Percentiles and
//! the median come from `statrs` order statistics; mean and standard
//! deviation from the `statrs` `Statistics` trait.

use statrs::statistics::{Data, Max, Min, OrderStatistics, Statistics};

use crate::types::{Percentiles, StatisticalSummary};

/// Summarize a derived series with the arithmetic mean.
pub fn summarize(values: &[Option<f64>]) -> StatisticalSummary {
    summarize_inner(values, MeanKind::Arithmetic)
}

/// Summarize a derived series with the geometric mean.
///
/// Used by the permeability calculator: log-derived permeability is
/// log-normally distributed, so the arithmetic mean overstates the central
/// tendency.
pub fn summarize_log_normal(values: &[Option<f64>]) -> StatisticalSummary {
    summarize_inner(values, MeanKind::Geometric)
}

enum MeanKind {
    Arithmetic,
    Geometric,
}

fn summarize_inner(values: &[Option<f64>], mean_kind: MeanKind) -> StatisticalSummary {
    let valid: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    let total_count = values.len();
    let valid_count = valid.len();

    if valid.is_empty() {
        return StatisticalSummary::empty(total_count);
    }

    let mean = match mean_kind {
        MeanKind::Arithmetic => valid.as_slice().mean(),
        MeanKind::Geometric => geometric_mean(&valid),
    };

    // Sample std-dev needs n >= 2
    let std_dev = if valid_count < 2 {
        0.0
    } else {
        valid.as_slice().std_dev()
    };

    let mut data = Data::new(valid);
    let percentiles = Percentiles {
        p10: data.percentile(10),
        p25: data.percentile(25),
        p50: data.percentile(50),
        p75: data.percentile(75),
        p90: data.percentile(90),
    };

    StatisticalSummary {
        mean,
        median: data.median(),
        std_dev,
        min: data.min(),
        max: data.max(),
        percentiles,
        total_count,
        valid_count,
    }
}

/// Geometric mean over the positive samples.
///
/// Non-positive samples cannot enter the log and are skipped; if none
/// remain the result is 0.
fn geometric_mean(valid: &[f64]) -> f64 {
    let positive: Vec<f64> = valid.iter().copied().filter(|v| *v > 0.0).collect();
    if positive.is_empty() {
        return 0.0;
    }
    positive.as_slice().geometric_mean()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(vals: &[f64]) -> Vec<Option<f64>> {
        vals.iter().map(|&v| Some(v)).collect()
    }

    #[test]
    fn summarize_skips_nulls() {
        let values = vec![Some(1.0), None, Some(3.0), None, Some(5.0)];
        let s = summarize(&values);
        assert_eq!(s.total_count, 5);
        assert_eq!(s.valid_count, 3);
        assert!((s.mean - 3.0).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
    }

    #[test]
    fn all_null_series_yields_zeroed_summary() {
        let values: Vec<Option<f64>> = vec![None; 10];
        let s = summarize(&values);
        assert_eq!(s.total_count, 10);
        assert_eq!(s.valid_count, 0);
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.std_dev, 0.0);
    }

    #[test]
    fn single_sample_has_zero_std_dev() {
        let s = summarize(&series(&[7.5]));
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.mean, 7.5);
        assert_eq!(s.median, 7.5);
    }

    #[test]
    fn median_and_percentiles_are_ordered() {
        let s = summarize(&series(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0]));
        let p = s.percentiles;
        assert!(p.p10 <= p.p25);
        assert!(p.p25 <= p.p50);
        assert!(p.p50 <= p.p75);
        assert!(p.p75 <= p.p90);
        assert!((s.median - p.p50).abs() < 1e-9);
    }

    #[test]
    fn geometric_mean_sits_below_arithmetic_on_log_normal_data() {
        // Spread over three decades, as permeability typically is
        let values = series(&[0.1, 1.0, 10.0, 100.0, 1000.0]);
        let geo = summarize_log_normal(&values);
        let arith = summarize(&values);
        assert!(
            geo.mean < arith.mean,
            "geometric {} should be below arithmetic {}",
            geo.mean,
            arith.mean
        );
        // 10^((-1+0+1+2+3)/5) = 10
        assert!((geo.mean - 10.0).abs() < 1e-9);
    }

    #[test]
    fn geometric_mean_skips_non_positive_samples() {
        let values = vec![Some(0.0), Some(-5.0), Some(10.0), Some(1000.0)];
        let s = summarize_log_normal(&values);
        // Only 10 and 1000 enter the log: 10^((1+3)/2) = 100
        assert!((s.mean - 100.0).abs() < 1e-9);
    }

    #[test]
    fn std_dev_matches_sample_formula() {
        let s = summarize(&series(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]));
        // Sample std-dev of this classic series is ~2.138
        assert!((s.std_dev - 2.138).abs() < 0.01, "got {}", s.std_dev);
    }
}
