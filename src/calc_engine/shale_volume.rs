//! Shale volume from gamma-ray, via the gamma-ray index.
//!
//! Every method starts from `IGR = clamp01((GR - gr_clean) / (gr_shale -
//! gr_clean))`, with GR outside [0, 500] API mapped to `None` before the
//! clamp. Outputs clamp to [0, 1] only after the formula - the raw GR is
//! never clamped.

use crate::error::CalcError;
use crate::types::{CalculationParameters, CalculationType, ConfidenceLevel};

use super::quality::UncertaintyBand;
use super::validation::{issue, Severity, ValidationReport};

/// Valid gamma-ray reading range, API units.
pub const GR_MIN: f64 = 0.0;
pub const GR_MAX: f64 = 500.0;

/// Baseline separation below this draws an advisory warning, API units.
pub const MIN_SEPARATION: f64 = 20.0;

/// Shale volume method selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaleMethod {
    Linear,
    LarionovTertiary,
    LarionovPreTertiary,
    Clavier,
}

impl ShaleMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::LarionovTertiary => "larionov_tertiary",
            Self::LarionovPreTertiary => "larionov_pre_tertiary",
            Self::Clavier => "clavier",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CalcError> {
        match s {
            "linear" => Ok(Self::Linear),
            "larionov_tertiary" => Ok(Self::LarionovTertiary),
            "larionov_pre_tertiary" => Ok(Self::LarionovPreTertiary),
            "clavier" => Ok(Self::Clavier),
            other => Err(CalcError::UnknownMethod {
                calc_type: CalculationType::ShaleVolume,
                method: other.to_string(),
            }),
        }
    }

    /// Relative uncertainty: the linear index is a direct reading (±5-10%),
    /// the nonlinear correlations add model error (±10-15%).
    pub fn uncertainty_band(&self) -> UncertaintyBand {
        match self {
            Self::Linear => UncertaintyBand::new(0.05, 0.10),
            _ => UncertaintyBand::new(0.10, 0.15),
        }
    }

    pub fn environmental_corrections(&self) -> &'static [&'static str] {
        &["borehole_size", "casing", "barite_mud"]
    }

    pub fn methodology(&self) -> &'static str {
        match self {
            Self::Linear => "Linear: Vsh = IGR",
            Self::LarionovTertiary => "Larionov (tertiary): Vsh = 0.083 * (2^(3.7*IGR) - 1)",
            Self::LarionovPreTertiary => "Larionov (pre-tertiary): Vsh = 0.33 * (2^(2*IGR) - 1)",
            Self::Clavier => "Clavier: Vsh = 1.7 - sqrt(3.38 - (IGR + 0.7)^2)",
        }
    }
}

/// Confidence cap for shale volume results (no cap).
pub const CONFIDENCE_CAP: ConfidenceLevel = ConfidenceLevel::High;

/// Gamma-ray index for one sample. GR outside [0, 500] -> `None`; the
/// index itself clamps to [0, 1].
fn gamma_ray_index(gr: f64, gr_clean: f64, gr_shale: f64) -> Option<f64> {
    if !(GR_MIN..=GR_MAX).contains(&gr) {
        return None;
    }
    let span = gr_shale - gr_clean;
    if span <= 0.0 {
        // Undefined/inverted baselines - validation blocks this upstream
        return None;
    }
    Some(((gr - gr_clean) / span).clamp(0.0, 1.0))
}

/// Compute shale volume for a GR curve with the given method.
pub fn shale_volume(
    gr: &[Option<f64>],
    method: ShaleMethod,
    params: &CalculationParameters,
) -> Vec<Option<f64>> {
    gr.iter()
        .map(|sample| {
            let gr = (*sample)?;
            let igr = gamma_ray_index(gr, params.gr_clean, params.gr_shale)?;
            let vsh = match method {
                ShaleMethod::Linear => igr,
                ShaleMethod::LarionovTertiary => 0.083 * ((3.7 * igr).exp2() - 1.0),
                ShaleMethod::LarionovPreTertiary => 0.33 * ((2.0 * igr).exp2() - 1.0),
                ShaleMethod::Clavier => {
                    let radicand = 3.38 - (igr + 0.7).powi(2);
                    if radicand < 0.0 {
                        // Negative radicand is a numerical edge, not a NaN
                        return None;
                    }
                    1.7 - radicand.sqrt()
                }
            };
            Some(vsh.clamp(0.0, 1.0))
        })
        .collect()
}

/// Validate shale volume parameters.
pub fn validate_parameters(params: &CalculationParameters) -> ValidationReport {
    let mut issues = Vec::new();

    if !(0.0..=200.0).contains(&params.gr_clean) {
        issues.push(issue(
            "gr_clean",
            format!(
                "clean baseline {:.0} API is outside the expected range (0-200)",
                params.gr_clean
            ),
            Severity::Critical,
            "pick the clean-sand GR reading from a known clean interval",
        ));
    }

    if !(50.0..=500.0).contains(&params.gr_shale) {
        issues.push(issue(
            "gr_shale",
            format!(
                "shale baseline {:.0} API is outside the expected range (50-500)",
                params.gr_shale
            ),
            Severity::Critical,
            "pick the shale GR reading from a known shale interval",
        ));
    }

    if params.gr_shale <= params.gr_clean {
        // IGR is undefined or inverted - blocks regardless of other values
        issues.push(issue(
            "gr_shale",
            format!(
                "shale baseline {:.0} must exceed clean baseline {:.0} - the index is inverted",
                params.gr_shale, params.gr_clean
            ),
            Severity::Critical,
            "swap the baselines or re-pick them from the log",
        ));
    } else if params.gr_shale - params.gr_clean < MIN_SEPARATION {
        issues.push(issue(
            "gr_shale",
            format!(
                "baseline separation {:.0} API is below {:.0} - Vsh resolution will be poor",
                params.gr_shale - params.gr_clean,
                MIN_SEPARATION
            ),
            Severity::Minor,
            "widen the clean/shale separation if the log supports it",
        ));
    }

    ValidationReport::from_issues(issues)
}
