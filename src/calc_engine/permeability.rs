//! Permeability estimation from porosity (and irreducible water
//! saturation).
//!
//! All three correlations are uncalibrated against core, so confidence is
//! capped at MEDIUM and the uncertainty bands are wide and asymmetric.
//! Results at or below 0 mD, or above 1e6 mD, are non-physical and map to
//! `None`.

use crate::error::CalcError;
use crate::types::{CalculationParameters, CalculationType, ConfidenceLevel};

use super::quality::UncertaintyBand;
use super::validation::{issue, Severity, ValidationReport};

/// Upper bound on physically plausible log-derived permeability, mD.
pub const MAX_PERMEABILITY_MD: f64 = 1e6;

/// cm^2 to millidarcy conversion factor.
pub const CM2_TO_MD: f64 = 1.013e9;

/// Permeability method selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermeabilityMethod {
    KozenyCarman,
    Timur,
    CoatesDumanoir,
}

impl PermeabilityMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KozenyCarman => "kozeny_carman",
            Self::Timur => "timur",
            Self::CoatesDumanoir => "coates_dumanoir",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CalcError> {
        match s {
            "kozeny_carman" => Ok(Self::KozenyCarman),
            "timur" => Ok(Self::Timur),
            "coates_dumanoir" => Ok(Self::CoatesDumanoir),
            other => Err(CalcError::UnknownMethod {
                calc_type: CalculationType::Permeability,
                method: other.to_string(),
            }),
        }
    }

    /// Kozeny-Carman ±50-70%; the Swi-based correlations ±30-50%.
    pub fn uncertainty_band(&self) -> UncertaintyBand {
        match self {
            Self::KozenyCarman => UncertaintyBand::new(0.50, 0.70),
            Self::Timur | Self::CoatesDumanoir => UncertaintyBand::new(0.30, 0.50),
        }
    }

    pub fn environmental_corrections(&self) -> &'static [&'static str] {
        &[]
    }

    pub fn methodology(&self) -> &'static str {
        match self {
            Self::KozenyCarman => {
                "Kozeny-Carman: k = (phi^3 / (1-phi)^2) * (d_cm^2 / 180), cm^2 to mD via 1.013e9"
            }
            Self::Timur => "Timur: k = 0.136 * phi^4.4 / Swi^2",
            Self::CoatesDumanoir => "Coates-Dumanoir: k = c * phi^x / Swi^y",
        }
    }
}

/// Log-derived permeability is uncalibrated by construction - never HIGH.
pub const CONFIDENCE_CAP: ConfidenceLevel = ConfidenceLevel::Medium;

/// Reject non-physical results: `<= 0` or `> 1e6` mD.
fn physical(k: f64) -> Option<f64> {
    if k.is_finite() && k > 0.0 && k <= MAX_PERMEABILITY_MD {
        Some(k)
    } else {
        None
    }
}

/// Per-sample Swi: the curve value when present, the scalar default
/// otherwise. Non-physical Swi (outside (0, 1]) -> `None`.
fn swi_at(swi_curve: Option<&[Option<f64>]>, i: usize, default: f64) -> Option<f64> {
    let swi = match swi_curve {
        Some(curve) => curve.get(i).copied().flatten().unwrap_or(default),
        None => default,
    };
    if swi > 0.0 && swi <= 1.0 {
        Some(swi)
    } else {
        None
    }
}

/// Kozeny-Carman: `k = (phi^3 / (1-phi)^2) * (d_cm^2 / 180)`.
///
/// Porosity at 0 or 1 is physically degenerate here (no pore network / no
/// matrix) - exclusive bounds, `None` at the boundary.
pub fn kozeny_carman(phi: &[Option<f64>], params: &CalculationParameters) -> Vec<Option<f64>> {
    let d_cm = params.grain_size / 10.0; // mm -> cm
    phi.iter()
        .map(|sample| {
            let phi = (*sample)?;
            if phi <= 0.0 || phi >= 1.0 {
                return None;
            }
            let k_cm2 = (phi.powi(3) / (1.0 - phi).powi(2)) * (d_cm * d_cm / 180.0);
            physical(k_cm2 * CM2_TO_MD)
        })
        .collect()
}

/// Timur: `k = 0.136 * phi^4.4 / Swi^2`. Accepts a per-sample Swi curve or
/// the scalar default from the parameters.
pub fn timur(
    phi: &[Option<f64>],
    swi_curve: Option<&[Option<f64>]>,
    params: &CalculationParameters,
) -> Vec<Option<f64>> {
    phi.iter()
        .enumerate()
        .map(|(i, sample)| {
            let phi = (*sample)?;
            if phi <= 0.0 || phi >= 1.0 {
                return None;
            }
            let swi = swi_at(swi_curve, i, params.swi)?;
            physical(0.136 * phi.powf(4.4) / (swi * swi))
        })
        .collect()
}

/// Coates-Dumanoir: `k = c * phi^x / Swi^y` with configurable constants.
pub fn coates_dumanoir(
    phi: &[Option<f64>],
    swi_curve: Option<&[Option<f64>]>,
    params: &CalculationParameters,
) -> Vec<Option<f64>> {
    let (c, x, y) = (params.perm_c, params.perm_x, params.perm_y);
    phi.iter()
        .enumerate()
        .map(|(i, sample)| {
            let phi = (*sample)?;
            if phi <= 0.0 || phi >= 1.0 {
                return None;
            }
            let swi = swi_at(swi_curve, i, params.swi)?;
            physical(c * phi.powf(x) / swi.powf(y))
        })
        .collect()
}

/// Validate permeability parameters.
pub fn validate_parameters(params: &CalculationParameters) -> ValidationReport {
    let mut issues = Vec::new();

    if params.grain_size <= 0.0 || params.grain_size > 2.0 {
        issues.push(issue(
            "grain_size",
            format!(
                "grain size {:.3} mm is outside (0, 2.0] - sand grains top out near 2 mm",
                params.grain_size
            ),
            Severity::Critical,
            "use 0.1-0.5 mm for typical reservoir sand",
        ));
    }

    if params.swi <= 0.0 || params.swi >= 1.0 {
        issues.push(issue(
            "swi",
            format!(
                "irreducible saturation {:.2} must be inside (0, 1) - it divides the formula",
                params.swi
            ),
            Severity::Critical,
            "use 0.15-0.35 for typical reservoir rock",
        ));
    }

    if params.perm_c <= 0.0 {
        issues.push(issue(
            "perm_c",
            format!("Coates-Dumanoir coefficient {:.0} must be positive", params.perm_c),
            Severity::Critical,
            "the published constant is 10000",
        ));
    }

    if params.perm_y == 0.0 {
        issues.push(issue(
            "perm_y",
            "Coates-Dumanoir saturation exponent of 0 disables the Swi term".to_string(),
            Severity::Critical,
            "the published exponent is 2.0",
        ));
    }

    ValidationReport::from_issues(issues)
}
