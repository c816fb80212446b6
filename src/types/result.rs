//! Derived calculation results: value series, uncertainty, quality,
//! statistics.
//!
//! A `CalculationResult` is immutable once produced - a new parameter edit
//! produces a new result object, never an in-place mutation. The cache
//! hands results out as `Arc<CalculationResult>` so an unchanged re-request
//! returns the identical allocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parameters::CalculationParameters;

/// Confidence in a derived curve, driven by data completeness and input
/// curve quality. Never user-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Completeness below 0.7, or poor input data
    Low,
    /// Completeness 0.7-0.9, or an uncalibrated method
    Medium,
    /// Completeness >= 0.9 with good input data
    High,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deterministic quality descriptor attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Fraction of output samples that are present, 0..1
    pub data_completeness: f64,
    /// Relative uncertainty band (lo, hi), e.g. (0.02, 0.03) for ±2-3%
    pub uncertainty_range: (f64, f64),
    /// Derived confidence level
    pub confidence: ConfidenceLevel,
    /// Environmental corrections assumed applied to the inputs
    pub environmental_corrections: Vec<String>,
}

/// Named percentiles of the valid samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl Percentiles {
    pub fn zero() -> Self {
        Self {
            p10: 0.0,
            p25: 0.0,
            p50: 0.0,
            p75: 0.0,
            p90: 0.0,
        }
    }
}

/// Summary statistics over a derived series, null-aware.
///
/// For permeability the `mean` is the geometric mean - log-derived
/// permeability is log-normally distributed, so the arithmetic mean would
/// overstate the central tendency. Every other calculation uses the
/// arithmetic mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
    /// All samples, including absent ones
    pub total_count: usize,
    /// Present samples only
    pub valid_count: usize,
}

impl StatisticalSummary {
    /// Zeroed summary for an all-null series.
    pub fn empty(total_count: usize) -> Self {
        Self {
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            percentiles: Percentiles::zero(),
            total_count,
            valid_count: 0,
        }
    }
}

/// One derived property curve with everything a consumer needs to render
/// or report it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Derived values; `None` marks a sample the formula could not produce
    pub values: Vec<Option<f64>>,
    /// Depth axis aligned with `values`
    pub depths: Vec<f64>,
    /// Per-sample absolute uncertainty, `None` where the value is absent
    pub uncertainty: Vec<Option<f64>>,
    /// Deterministic quality descriptor
    pub quality: QualityMetrics,
    /// Null-aware summary statistics
    pub statistics: StatisticalSummary,
    /// Human-readable description of the formula applied
    pub methodology: String,
    /// Parameter snapshot the result was computed with
    pub parameters: CalculationParameters,
    /// Computation time
    pub timestamp: DateTime<Utc>,
}
