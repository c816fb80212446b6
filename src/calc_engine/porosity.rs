//! Porosity calculations from density and neutron logs.
//!
//! Out-of-range inputs and out-of-range results map to `None` - surfaced
//! as missing, never clamped. Clamping a bulk density of 0.5 g/cc to the
//! physical range would hide a tool failure as a plausible rock.

use crate::error::CalcError;
use crate::types::{CalculationParameters, CalculationType, ConfidenceLevel};

use super::quality::UncertaintyBand;
use super::validation::{issue, Severity, ValidationReport};

/// Physically plausible bulk density range, g/cc.
pub const RHOB_MIN: f64 = 1.0;
pub const RHOB_MAX: f64 = 4.0;

/// Neutron porosity log range, percent.
pub const NPHI_MIN: f64 = 0.0;
pub const NPHI_MAX: f64 = 100.0;

/// Porosity method selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PorosityMethod {
    Density,
    Neutron,
    Effective,
    Total,
}

impl PorosityMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Density => "density",
            Self::Neutron => "neutron",
            Self::Effective => "effective",
            Self::Total => "total",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CalcError> {
        match s {
            "density" | "rhob" => Ok(Self::Density),
            "neutron" | "nphi" => Ok(Self::Neutron),
            "effective" => Ok(Self::Effective),
            "total" => Ok(Self::Total),
            other => Err(CalcError::UnknownMethod {
                calc_type: CalculationType::Porosity,
                method: other.to_string(),
            }),
        }
    }

    /// Relative uncertainty band: density tools resolve ±2-3%, neutron and
    /// the combined methods ±3-5%.
    pub fn uncertainty_band(&self) -> UncertaintyBand {
        match self {
            Self::Density => UncertaintyBand::new(0.02, 0.03),
            Self::Neutron | Self::Effective | Self::Total => UncertaintyBand::new(0.03, 0.05),
        }
    }

    /// Corrections assumed applied to the input log.
    pub fn environmental_corrections(&self) -> &'static [&'static str] {
        match self {
            Self::Density => &["borehole_size", "mud_cake"],
            Self::Neutron => &["borehole_salinity", "temperature"],
            Self::Effective | Self::Total => {
                &["borehole_size", "mud_cake", "borehole_salinity", "temperature"]
            }
        }
    }

    /// Human-readable formula description for the result record.
    pub fn methodology(&self) -> &'static str {
        match self {
            Self::Density => "Density porosity: phiD = (rho_ma - rho_b) / (rho_ma - rho_f)",
            Self::Neutron => "Neutron porosity: phiN = NPHI / 100",
            Self::Effective => "Effective porosity: phiE = (phiD + phiN) / 2",
            Self::Total => "Total porosity: phiN, or (phiD + phiN) / 2 when density is available",
        }
    }
}

/// Confidence cap for porosity results (no cap).
pub const CONFIDENCE_CAP: ConfidenceLevel = ConfidenceLevel::High;

/// Density porosity: `phiD = (rho_ma - rho_b) / (rho_ma - rho_f)`.
///
/// RHOB outside [1.0, 4.0] g/cc, and results outside [0, 1], map to `None`.
pub fn density_porosity(rhob: &[Option<f64>], params: &CalculationParameters) -> Vec<Option<f64>> {
    let rho_ma = params.matrix_density;
    let rho_f = params.fluid_density;
    rhob.iter()
        .map(|sample| {
            let rho_b = (*sample)?;
            if !(RHOB_MIN..=RHOB_MAX).contains(&rho_b) {
                return None;
            }
            let denom = rho_ma - rho_f;
            if denom == 0.0 {
                return None;
            }
            let phi = (rho_ma - rho_b) / denom;
            if (0.0..=1.0).contains(&phi) {
                Some(phi)
            } else {
                None
            }
        })
        .collect()
}

/// Neutron porosity: `phiN = NPHI / 100`. NPHI outside [0, 100] -> `None`.
pub fn neutron_porosity(nphi: &[Option<f64>]) -> Vec<Option<f64>> {
    nphi.iter()
        .map(|sample| {
            let v = (*sample)?;
            if !(NPHI_MIN..=NPHI_MAX).contains(&v) {
                return None;
            }
            Some(v / 100.0)
        })
        .collect()
}

/// Effective porosity: arithmetic mean of density and neutron porosity.
///
/// A length mismatch is a caller contract violation, not a data issue,
/// and fails the whole request.
pub fn effective_porosity(
    phi_d: &[Option<f64>],
    phi_n: &[Option<f64>],
) -> Result<Vec<Option<f64>>, CalcError> {
    if phi_d.len() != phi_n.len() {
        return Err(CalcError::CurveLengthMismatch {
            expected: phi_d.len(),
            actual: phi_n.len(),
        });
    }
    Ok(phi_d
        .iter()
        .zip(phi_n.iter())
        .map(|(d, n)| match (d, n) {
            (Some(d), Some(n)) => Some((d + n) / 2.0),
            _ => None,
        })
        .collect())
}

/// Total porosity: neutron porosity when density data is unavailable,
/// effective porosity otherwise.
pub fn total_porosity(
    rhob: Option<&[Option<f64>]>,
    nphi: &[Option<f64>],
    params: &CalculationParameters,
) -> Result<Vec<Option<f64>>, CalcError> {
    match rhob {
        Some(rhob) => {
            let phi_d = density_porosity(rhob, params);
            let phi_n = neutron_porosity(nphi);
            effective_porosity(&phi_d, &phi_n)
        }
        None => Ok(neutron_porosity(nphi)),
    }
}

/// Validate porosity parameters.
pub fn validate_parameters(params: &CalculationParameters) -> ValidationReport {
    let mut issues = Vec::new();

    if !(RHOB_MIN..=RHOB_MAX).contains(&params.matrix_density) {
        issues.push(issue(
            "matrix_density",
            format!(
                "matrix density {:.2} g/cc is outside the physical range ({:.1}-{:.1})",
                params.matrix_density, RHOB_MIN, RHOB_MAX
            ),
            Severity::Critical,
            "use 2.65 for sandstone, 2.71 for limestone, 2.87 for dolomite",
        ));
    }

    if !(RHOB_MIN..=RHOB_MAX).contains(&params.fluid_density) {
        issues.push(issue(
            "fluid_density",
            format!(
                "fluid density {:.2} g/cc is outside the physical range ({:.1}-{:.1})",
                params.fluid_density, RHOB_MIN, RHOB_MAX
            ),
            Severity::Critical,
            "use 1.0 for fresh filtrate, 1.1 for salt mud",
        ));
    } else if params.matrix_density <= params.fluid_density {
        // Denominator of the density equation degenerates
        issues.push(issue(
            "matrix_density",
            format!(
                "matrix density {:.2} must exceed fluid density {:.2}",
                params.matrix_density, params.fluid_density
            ),
            Severity::Critical,
            "set matrix_density above fluid_density",
        ));
    } else if params.matrix_density - params.fluid_density < 0.5 {
        issues.push(issue(
            "matrix_density",
            format!(
                "matrix/fluid separation {:.2} g/cc is small - porosity will be noisy",
                params.matrix_density - params.fluid_density
            ),
            Severity::Minor,
            "verify both densities against the mud program",
        ));
    }

    ValidationReport::from_issues(issues)
}
