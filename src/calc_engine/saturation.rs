//! Water saturation from resistivity and porosity (Archie family).
//!
//! `Sw = ((a * Rw) / (phi^m * Rt))^(1/n)`. Degenerate samples (non-positive
//! porosity or resistivity) and post-formula values outside [0, 1] map to
//! `None`.

use crate::error::CalcError;
use crate::types::{CalculationParameters, CalculationType, ConfidenceLevel};

use super::quality::UncertaintyBand;
use super::validation::{issue, Severity, ValidationReport};

/// Saturation method selection. Archie only - Simandoux-style shaly-sand
/// variants would introduce parameters outside the watched-field contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaturationMethod {
    Archie,
}

impl SaturationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archie => "archie",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CalcError> {
        match s {
            "archie" => Ok(Self::Archie),
            other => Err(CalcError::UnknownMethod {
                calc_type: CalculationType::Saturation,
                method: other.to_string(),
            }),
        }
    }

    /// Archie in clean sand carries ±15-25% relative uncertainty.
    pub fn uncertainty_band(&self) -> UncertaintyBand {
        UncertaintyBand::new(0.15, 0.25)
    }

    pub fn environmental_corrections(&self) -> &'static [&'static str] {
        &["invasion", "borehole_signal", "temperature"]
    }

    pub fn methodology(&self) -> &'static str {
        "Archie: Sw = ((a * Rw) / (phi^m * Rt))^(1/n)"
    }
}

/// Confidence cap for saturation results (no cap).
pub const CONFIDENCE_CAP: ConfidenceLevel = ConfidenceLevel::High;

/// Archie water saturation over aligned resistivity and porosity series.
///
/// A length mismatch between the two inputs fails the request; per-sample
/// degeneracies become `None`.
pub fn water_saturation(
    rt: &[Option<f64>],
    porosity: &[Option<f64>],
    params: &CalculationParameters,
) -> Result<Vec<Option<f64>>, CalcError> {
    if rt.len() != porosity.len() {
        return Err(CalcError::CurveLengthMismatch {
            expected: rt.len(),
            actual: porosity.len(),
        });
    }

    let (a, m, n, rw) = (params.a, params.m, params.n, params.rw);

    Ok(rt
        .iter()
        .zip(porosity.iter())
        .map(|(rt, phi)| {
            let rt = (*rt)?;
            let phi = (*phi)?;
            // Zero porosity or non-positive resistivity degenerate the formula
            if phi <= 0.0 || rt <= 0.0 {
                return None;
            }
            let sw = ((a * rw) / (phi.powf(m) * rt)).powf(1.0 / n);
            if sw.is_finite() && (0.0..=1.0).contains(&sw) {
                Some(sw)
            } else {
                None
            }
        })
        .collect())
}

/// Validate Archie parameters.
pub fn validate_parameters(params: &CalculationParameters) -> ValidationReport {
    let mut issues = Vec::new();

    if params.rw <= 0.0 || params.rw > 10.0 {
        issues.push(issue(
            "rw",
            format!(
                "formation water resistivity {:.3} ohm.m is outside (0, 10]",
                params.rw
            ),
            Severity::Critical,
            "derive Rw from a water catalog or SP log (typically 0.01-1 ohm.m)",
        ));
    }

    if params.n <= 0.0 {
        issues.push(issue(
            "n",
            format!("saturation exponent {:.2} must be positive (used as a root)", params.n),
            Severity::Critical,
            "use 2.0 unless core data says otherwise",
        ));
    } else if !(1.5..=3.0).contains(&params.n) {
        issues.push(issue(
            "n",
            format!("saturation exponent {:.2} is outside the textbook range (1.5-3.0)", params.n),
            Severity::Minor,
            "use 2.0 unless core data says otherwise",
        ));
    }

    if !(0.5..=2.0).contains(&params.a) {
        issues.push(issue(
            "a",
            format!("tortuosity factor {:.2} is outside the textbook range (0.5-2.0)", params.a),
            Severity::Minor,
            "use 1.0 (Archie) or 0.62 (Humble)",
        ));
    }

    if !(1.5..=3.0).contains(&params.m) {
        issues.push(issue(
            "m",
            format!("cementation exponent {:.2} is outside the textbook range (1.5-3.0)", params.m),
            Severity::Minor,
            "use 2.0 for consolidated sands",
        ));
    }

    ValidationReport::from_issues(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(vals: &[f64]) -> Vec<Option<f64>> {
        vals.iter().map(|&v| Some(v)).collect()
    }

    #[test]
    fn archie_hand_calculation() {
        // a=1, m=2, n=2, rw=0.1, phi=0.25, rt=8:
        // Sw = (0.1 / (0.0625 * 8))^0.5 = (0.2)^0.5 ~= 0.4472
        let params = CalculationParameters::default();
        let sw = water_saturation(&wrap(&[8.0]), &wrap(&[0.25]), &params).expect("aligned");
        assert!((sw[0].expect("present") - 0.2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn low_resistivity_saturates_to_one() {
        let params = CalculationParameters::default();
        // phi=0.25: Sw = 1 exactly when rt = 0.1/0.0625 = 1.6
        let sw = water_saturation(&wrap(&[1.6]), &wrap(&[0.25]), &params).expect("aligned");
        assert!((sw[0].expect("present") - 1.0).abs() < 1e-12);
        // Even lower Rt pushes Sw beyond 1 - non-physical, null
        let sw = water_saturation(&wrap(&[0.5]), &wrap(&[0.25]), &params).expect("aligned");
        assert_eq!(sw[0], None);
    }

    #[test]
    fn degenerate_samples_are_null() {
        let params = CalculationParameters::default();
        let sw = water_saturation(
            &wrap(&[8.0, -1.0, 8.0]),
            &wrap(&[0.0, 0.25, 0.25]),
            &params,
        )
        .expect("aligned");
        assert_eq!(sw[0], None, "zero porosity");
        assert_eq!(sw[1], None, "negative resistivity");
        assert!(sw[2].is_some());
    }

    #[test]
    fn nulls_propagate() {
        let params = CalculationParameters::default();
        let sw = water_saturation(&[Some(8.0), None], &[None, Some(0.25)], &params)
            .expect("aligned");
        assert_eq!(sw, vec![None, None]);
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let params = CalculationParameters::default();
        let err = water_saturation(&wrap(&[8.0, 9.0]), &wrap(&[0.25]), &params).unwrap_err();
        assert!(matches!(err, CalcError::CurveLengthMismatch { .. }));
    }

    #[test]
    fn higher_resistivity_means_less_water() {
        let params = CalculationParameters::default();
        let sw = water_saturation(&wrap(&[2.0, 8.0, 32.0]), &wrap(&[0.25, 0.25, 0.25]), &params)
            .expect("aligned");
        let v: Vec<f64> = sw.iter().map(|s| s.expect("present")).collect();
        assert!(v[0] > v[1] && v[1] > v[2], "Sw must fall as Rt rises: {:?}", v);
    }

    #[test]
    fn validate_rejects_non_positive_rw() {
        let params = CalculationParameters {
            rw: 0.0,
            ..CalculationParameters::default()
        };
        let report = validate_parameters(&params);
        assert!(!report.is_valid);
    }

    #[test]
    fn validate_warns_on_unusual_exponents() {
        let params = CalculationParameters {
            m: 1.2,
            a: 2.5,
            ..CalculationParameters::default()
        };
        let report = validate_parameters(&params);
        assert!(report.is_valid, "exponent warnings must not block");
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn validate_defaults_are_clean() {
        let report = validate_parameters(&CalculationParameters::default());
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
    }
}
