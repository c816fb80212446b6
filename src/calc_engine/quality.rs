//! Quality metrics and uncertainty derivation.
//!
//! Everything here is deterministic in (completeness, input curve quality,
//! method) - quality is never user-set. Uncertainty is a relative band
//! per method; the band widens 1.5x when data completeness drops below
//! 0.8, and the per-sample uncertainty array is `|value| * band midpoint`.

use crate::types::{ConfidenceLevel, CurveQuality, QualityMetrics};

/// Completeness at or above this is eligible for HIGH confidence.
pub const HIGH_COMPLETENESS: f64 = 0.9;

/// Completeness at or above this is eligible for MEDIUM confidence.
pub const MEDIUM_COMPLETENESS: f64 = 0.7;

/// Below this completeness, uncertainty bands widen.
pub const WIDEN_COMPLETENESS: f64 = 0.8;

/// Band widening factor applied below [`WIDEN_COMPLETENESS`].
pub const WIDEN_FACTOR: f64 = 1.5;

/// Relative uncertainty band (lo, hi) before completeness widening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyBand {
    pub lo: f64,
    pub hi: f64,
}

impl UncertaintyBand {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Widen the band when completeness is poor.
    pub fn for_completeness(self, completeness: f64) -> Self {
        if completeness < WIDEN_COMPLETENESS {
            Self {
                lo: self.lo * WIDEN_FACTOR,
                hi: self.hi * WIDEN_FACTOR,
            }
        } else {
            self
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }
}

/// Derive the confidence level from completeness and input curve quality.
///
/// Poor input data degrades the level one step; `cap` bounds the result
/// from above (permeability caps at MEDIUM - log-derived permeability is
/// uncalibrated by construction).
pub fn confidence_level(
    completeness: f64,
    input_quality: CurveQuality,
    cap: ConfidenceLevel,
) -> ConfidenceLevel {
    let base = if completeness >= HIGH_COMPLETENESS {
        ConfidenceLevel::High
    } else if completeness >= MEDIUM_COMPLETENESS {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };

    let degraded = match (base, input_quality) {
        (level, CurveQuality::Good | CurveQuality::Fair) => level,
        (ConfidenceLevel::High, CurveQuality::Poor) => ConfidenceLevel::Medium,
        (_, CurveQuality::Poor) => ConfidenceLevel::Low,
    };

    degraded.min(cap)
}

/// Assemble the full quality descriptor for a result.
pub fn derive_quality(
    completeness: f64,
    input_quality: CurveQuality,
    band: UncertaintyBand,
    cap: ConfidenceLevel,
    corrections: &[&str],
) -> QualityMetrics {
    let widened = band.for_completeness(completeness);
    QualityMetrics {
        data_completeness: completeness,
        uncertainty_range: (widened.lo, widened.hi),
        confidence: confidence_level(completeness, input_quality, cap),
        environmental_corrections: corrections.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// Per-sample absolute uncertainty: `|value| * band midpoint`, `None`
/// where the value is absent.
pub fn uncertainty_series(values: &[Option<f64>], band: UncertaintyBand) -> Vec<Option<f64>> {
    let mid = band.midpoint();
    values.iter().map(|v| v.map(|x| x.abs() * mid)).collect()
}

/// Completeness of a derived series: valid / total (0 for empty).
pub fn series_completeness(values: &[Option<f64>]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| v.is_some()).count() as f64 / values.len() as f64
}
