//! Log curve model: named, unit-tagged, depth-aligned sample series.
//!
//! Absence is represented by `Option<f64>` throughout the engine. The wire
//! null sentinel (-999.25) and NaN exist only at the ingestion boundary in
//! [`LogCurve::from_raw`]; nothing downstream compares against them.

use serde::{Deserialize, Serialize};

/// Wire-format null sentinel used by LAS/WITSML exports.
///
/// Confined to curve ingestion. Samples equal to this value (or NaN) are
/// mapped to `None` during construction.
pub const WIRE_NULL: f64 = -999.25;

/// Acquisition quality flag attached to a curve by the ingestion layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveQuality {
    /// Clean acquisition, no flagged intervals
    Good,
    /// Minor flagged intervals (washouts, tool sticking)
    Fair,
    /// Substantial flagged intervals - treat derived values with caution
    Poor,
}

impl CurveQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Poor => "POOR",
        }
    }
}

impl std::fmt::Display for CurveQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named, unit-tagged sequence of depth-aligned samples.
///
/// `samples` is never mutated after construction. Depth alignment is
/// implicit: all curves of one well share the axis produced by
/// [`WellLogData::depth_axis`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogCurve {
    /// Mnemonic (GR, RHOB, NPHI, RT, ...)
    pub name: String,
    /// Unit string as recorded (API, g/cc, v/v, ohm.m, ...)
    pub unit: String,
    /// Samples; `None` marks an absent/invalid measurement
    pub samples: Vec<Option<f64>>,
    /// Acquisition quality flag
    pub quality: CurveQuality,
}

impl LogCurve {
    /// Build a curve from raw wire samples, mapping the null sentinel and
    /// NaN to `None`.
    pub fn from_raw(name: &str, unit: &str, raw: &[f64], quality: CurveQuality) -> Self {
        let samples = raw
            .iter()
            .map(|&v| {
                if v.is_nan() || (v - WIRE_NULL).abs() < 1e-6 {
                    None
                } else {
                    Some(v)
                }
            })
            .collect();
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            samples,
            quality,
        }
    }

    /// Build a curve from already-clean optional samples.
    pub fn from_samples(
        name: &str,
        unit: &str,
        samples: Vec<Option<f64>>,
        quality: CurveQuality,
    ) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            samples,
            quality,
        }
    }

    /// Number of samples (including absent ones).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of present samples.
    pub fn valid_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }

    /// Fraction of present samples, 0..1. Empty curves report 0.
    pub fn completeness(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.valid_count() as f64 / self.samples.len() as f64
    }
}

/// One well's log data: name, recorded depth range, and curves sharing a
/// single implicit depth axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellLogData {
    /// Well identifier
    pub name: String,
    /// Recorded depth range (start, end), measured depth
    pub depth_range: (f64, f64),
    /// Curves, all sampled on the shared axis
    pub curves: Vec<LogCurve>,
}

impl WellLogData {
    pub fn new(name: &str, depth_range: (f64, f64), curves: Vec<LogCurve>) -> Self {
        Self {
            name: name.to_string(),
            depth_range,
            curves,
        }
    }

    /// Look up a curve by mnemonic, case-insensitive.
    pub fn curve(&self, mnemonic: &str) -> Option<&LogCurve> {
        self.curves
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(mnemonic))
    }

    /// Uniform depth axis over the recorded range:
    /// `depth(i) = start + i * (end - start) / (n - 1)`.
    ///
    /// A single-sample axis sits at the range start.
    pub fn depth_axis(&self, n: usize) -> Vec<f64> {
        let (start, end) = self.depth_range;
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![start];
        }
        let step = (end - start) / (n - 1) as f64;
        (0..n).map(|i| start + i as f64 * step).collect()
    }

    /// Indices of the depth axis falling inside `[top, bottom]`, inclusive
    /// on both ends.
    pub fn depth_window(&self, n: usize, top: f64, bottom: f64) -> Vec<usize> {
        self.depth_axis(n)
            .iter()
            .enumerate()
            .filter(|(_, &d)| d >= top && d <= bottom)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_maps_sentinel_and_nan_to_none() {
        let curve = LogCurve::from_raw(
            "GR",
            "API",
            &[45.0, WIRE_NULL, f64::NAN, 82.5],
            CurveQuality::Good,
        );
        assert_eq!(curve.samples, vec![Some(45.0), None, None, Some(82.5)]);
        assert_eq!(curve.valid_count(), 2);
        assert!((curve.completeness() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn curve_lookup_is_case_insensitive() {
        let well = WellLogData::new(
            "TEST-1",
            (1000.0, 2000.0),
            vec![LogCurve::from_raw("RHOB", "g/cc", &[2.45], CurveQuality::Good)],
        );
        assert!(well.curve("rhob").is_some());
        assert!(well.curve("Rhob").is_some());
        assert!(well.curve("NPHI").is_none());
    }

    #[test]
    fn depth_axis_spans_range_uniformly() {
        let well = WellLogData::new("TEST-1", (1000.0, 1040.0), Vec::new());
        let axis = well.depth_axis(5);
        assert_eq!(axis, vec![1000.0, 1010.0, 1020.0, 1030.0, 1040.0]);
    }

    #[test]
    fn depth_axis_degenerate_counts() {
        let well = WellLogData::new("TEST-1", (1000.0, 1040.0), Vec::new());
        assert!(well.depth_axis(0).is_empty());
        assert_eq!(well.depth_axis(1), vec![1000.0]);
    }

    #[test]
    fn depth_window_is_inclusive_on_both_ends() {
        let well = WellLogData::new("TEST-1", (1000.0, 1040.0), Vec::new());
        // Axis: 1000, 1010, 1020, 1030, 1040
        let idx = well.depth_window(5, 1010.0, 1030.0);
        assert_eq!(idx, vec![1, 2, 3]);
    }

    #[test]
    fn completeness_of_empty_curve_is_zero() {
        let curve = LogCurve::from_raw("GR", "API", &[], CurveQuality::Good);
        assert_eq!(curve.completeness(), 0.0);
    }
}
