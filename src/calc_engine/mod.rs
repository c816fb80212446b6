//! Calculation engine: the four petrophysical calculators plus their
//! shared validation, uncertainty, and statistics machinery.
//!
//! All math here is pure - calculators are functions from curves + a
//! resolved parameter record to a derived series. The only stateful piece
//! of the crate is the orchestrator; nothing in this module remembers
//! anything between calls.
//!
//! ## Calculators
//! - `porosity` - density / neutron / effective / total
//! - `shale_volume` - linear / Larionov (x2) / Clavier, via the GR index
//! - `saturation` - Archie water saturation
//! - `permeability` - Kozeny-Carman / Timur / Coates-Dumanoir
//!
//! [`compute`] dispatches one (well, type) item end to end: parse method,
//! validate parameters, resolve input curves, run the formula, derive
//! uncertainty + quality + statistics.

pub mod permeability;
pub mod porosity;
pub mod quality;
pub mod saturation;
pub mod shale_volume;
pub mod statistics;
pub mod validation;

pub use permeability::PermeabilityMethod;
pub use porosity::PorosityMethod;
pub use quality::UncertaintyBand;
pub use saturation::SaturationMethod;
pub use shale_volume::ShaleMethod;
pub use validation::{Severity, ValidationIssue, ValidationReport};

use chrono::Utc;

use crate::error::CalcError;
use crate::types::{
    CalculationParameters, CalculationResult, CalculationType, CurveQuality, LogCurve,
    WellLogData,
};

/// Validate the parameters relevant to one calculation type.
///
/// Errors block the calculation; warnings are advisory and rendered next
/// to the offending field.
pub fn validate_parameters(
    calc_type: CalculationType,
    params: &CalculationParameters,
) -> ValidationReport {
    match calc_type {
        CalculationType::Porosity => porosity::validate_parameters(params),
        CalculationType::ShaleVolume => shale_volume::validate_parameters(params),
        CalculationType::Saturation => saturation::validate_parameters(params),
        CalculationType::Permeability => permeability::validate_parameters(params),
    }
}

/// Resolve the input curves one (well, type) item reads.
///
/// The same resolution feeds both the computation and the cache's curve
/// fingerprint, so a cache hit always reflects exactly the data a
/// recompute would consume.
pub fn input_curves<'a>(
    well: &'a WellLogData,
    calc_type: CalculationType,
    params: &CalculationParameters,
) -> Result<Vec<&'a LogCurve>, CalcError> {
    let require = |mnemonic: &'static str| {
        well.curve(mnemonic).ok_or(CalcError::MissingCurve {
            well: well.name.clone(),
            curve: mnemonic,
            calc_type,
        })
    };

    match calc_type {
        CalculationType::Porosity => {
            match PorosityMethod::parse(params.method_str(calc_type))? {
                PorosityMethod::Density => Ok(vec![require("RHOB")?]),
                PorosityMethod::Neutron => Ok(vec![require("NPHI")?]),
                PorosityMethod::Effective => Ok(vec![require("RHOB")?, require("NPHI")?]),
                PorosityMethod::Total => {
                    let mut curves = vec![require("NPHI")?];
                    if let Some(rhob) = well.curve("RHOB") {
                        curves.insert(0, rhob);
                    }
                    Ok(curves)
                }
            }
        }
        CalculationType::ShaleVolume => {
            ShaleMethod::parse(params.method_str(calc_type))?;
            Ok(vec![require("GR")?])
        }
        CalculationType::Saturation => {
            SaturationMethod::parse(params.method_str(calc_type))?;
            let rt = well.curve("RT").or_else(|| well.curve("ILD"));
            let rt = rt.ok_or(CalcError::MissingCurve {
                well: well.name.clone(),
                curve: "RT",
                calc_type,
            })?;
            Ok(vec![rt, porosity_source(well, calc_type)?])
        }
        CalculationType::Permeability => {
            PermeabilityMethod::parse(params.method_str(calc_type))?;
            let mut curves = vec![porosity_source(well, calc_type)?];
            if let Some(swi) = well.curve("SWI") {
                curves.push(swi);
            }
            Ok(curves)
        }
    }
}

/// The curve porosity is derived from for downstream calculators:
/// density (RHOB) when available, neutron (NPHI) otherwise.
fn porosity_source<'a>(
    well: &'a WellLogData,
    calc_type: CalculationType,
) -> Result<&'a LogCurve, CalcError> {
    well.curve("RHOB")
        .or_else(|| well.curve("NPHI"))
        .ok_or(CalcError::MissingCurve {
            well: well.name.clone(),
            curve: "RHOB",
            calc_type,
        })
}

/// Porosity input series for saturation/permeability, from the resolved
/// source curve.
fn derived_porosity(source: &LogCurve, params: &CalculationParameters) -> Vec<Option<f64>> {
    if source.name.eq_ignore_ascii_case("RHOB") {
        porosity::density_porosity(&source.samples, params)
    } else {
        porosity::neutron_porosity(&source.samples)
    }
}

/// Worst acquisition quality among the inputs; defaults to Good for an
/// empty set.
fn worst_quality(curves: &[&LogCurve]) -> CurveQuality {
    let mut worst = CurveQuality::Good;
    for curve in curves {
        worst = match (worst, curve.quality) {
            (_, CurveQuality::Poor) | (CurveQuality::Poor, _) => CurveQuality::Poor,
            (_, CurveQuality::Fair) | (CurveQuality::Fair, _) => CurveQuality::Fair,
            _ => CurveQuality::Good,
        };
    }
    worst
}

/// Compute one (well, type) item end to end.
///
/// Fatal outcomes (`Err`): blocked validation, unknown method, missing
/// curve, mismatched curve lengths. Per-sample issues degrade to `None`
/// inside the returned series.
pub fn compute(
    well: &WellLogData,
    calc_type: CalculationType,
    params: &CalculationParameters,
) -> Result<CalculationResult, CalcError> {
    let report = validate_parameters(calc_type, params);
    if !report.is_valid {
        return Err(CalcError::InvalidParameters {
            calc_type,
            detail: report.error_digest(),
        });
    }

    let inputs = input_curves(well, calc_type, params)?;

    let (values, band, cap, corrections, methodology) = match calc_type {
        CalculationType::Porosity => {
            let method = PorosityMethod::parse(params.method_str(calc_type))?;
            let values = match method {
                PorosityMethod::Density => {
                    porosity::density_porosity(&inputs[0].samples, params)
                }
                PorosityMethod::Neutron => porosity::neutron_porosity(&inputs[0].samples),
                PorosityMethod::Effective => {
                    let phi_d = porosity::density_porosity(&inputs[0].samples, params);
                    let phi_n = porosity::neutron_porosity(&inputs[1].samples);
                    porosity::effective_porosity(&phi_d, &phi_n)?
                }
                PorosityMethod::Total => {
                    // Inputs are [RHOB, NPHI] or [NPHI] depending on availability
                    let rhob = well.curve("RHOB").map(|c| c.samples.as_slice());
                    let nphi = inputs.last().ok_or(CalcError::MissingCurve {
                        well: well.name.clone(),
                        curve: "NPHI",
                        calc_type,
                    })?;
                    porosity::total_porosity(rhob, &nphi.samples, params)?
                }
            };
            (
                values,
                method.uncertainty_band(),
                porosity::CONFIDENCE_CAP,
                method.environmental_corrections(),
                method.methodology(),
            )
        }
        CalculationType::ShaleVolume => {
            let method = ShaleMethod::parse(params.method_str(calc_type))?;
            let values = shale_volume::shale_volume(&inputs[0].samples, method, params);
            (
                values,
                method.uncertainty_band(),
                shale_volume::CONFIDENCE_CAP,
                method.environmental_corrections(),
                method.methodology(),
            )
        }
        CalculationType::Saturation => {
            let method = SaturationMethod::parse(params.method_str(calc_type))?;
            let phi = derived_porosity(inputs[1], params);
            let values = saturation::water_saturation(&inputs[0].samples, &phi, params)?;
            (
                values,
                method.uncertainty_band(),
                saturation::CONFIDENCE_CAP,
                method.environmental_corrections(),
                method.methodology(),
            )
        }
        CalculationType::Permeability => {
            let method = PermeabilityMethod::parse(params.method_str(calc_type))?;
            let phi = derived_porosity(inputs[0], params);
            let swi = inputs.get(1).map(|c| c.samples.as_slice());
            let values = match method {
                PermeabilityMethod::KozenyCarman => permeability::kozeny_carman(&phi, params),
                PermeabilityMethod::Timur => permeability::timur(&phi, swi, params),
                PermeabilityMethod::CoatesDumanoir => {
                    permeability::coates_dumanoir(&phi, swi, params)
                }
            };
            (
                values,
                method.uncertainty_band(),
                permeability::CONFIDENCE_CAP,
                method.environmental_corrections(),
                method.methodology(),
            )
        }
    };

    let completeness = quality::series_completeness(&values);
    let widened = band.for_completeness(completeness);
    let quality_metrics = quality::derive_quality(
        completeness,
        worst_quality(&inputs),
        band,
        cap,
        corrections,
    );
    let uncertainty = quality::uncertainty_series(&values, widened);

    let statistics = match calc_type {
        // Log-normal distribution: geometric mean, documented exception
        CalculationType::Permeability => statistics::summarize_log_normal(&values),
        _ => statistics::summarize(&values),
    };

    Ok(CalculationResult {
        depths: well.depth_axis(values.len()),
        values,
        uncertainty,
        quality: quality_metrics,
        statistics,
        methodology: methodology.to_string(),
        parameters: params.clone(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CurveQuality;

    fn make_well() -> WellLogData {
        let n = 5;
        let rhob: Vec<f64> = (0..n).map(|i| 2.2 + 0.1 * i as f64).collect();
        let nphi: Vec<f64> = (0..n).map(|i| 30.0 - 2.0 * i as f64).collect();
        let gr: Vec<f64> = (0..n).map(|i| 30.0 + 25.0 * i as f64).collect();
        let rt: Vec<f64> = (0..n).map(|i| 5.0 + 3.0 * i as f64).collect();
        WellLogData::new(
            "TEST-1",
            (2000.0, 2040.0),
            vec![
                LogCurve::from_raw("RHOB", "g/cc", &rhob, CurveQuality::Good),
                LogCurve::from_raw("NPHI", "%", &nphi, CurveQuality::Good),
                LogCurve::from_raw("GR", "API", &gr, CurveQuality::Good),
                LogCurve::from_raw("RT", "ohm.m", &rt, CurveQuality::Good),
            ],
        )
    }

    #[test]
    fn compute_porosity_full_result() {
        let well = make_well();
        let params = CalculationParameters::default();
        let result = compute(&well, CalculationType::Porosity, &params).expect("computes");

        assert_eq!(result.values.len(), 5);
        assert_eq!(result.depths.len(), 5);
        assert_eq!(result.uncertainty.len(), 5);
        assert_eq!(result.depths[0], 2000.0);
        assert_eq!(result.depths[4], 2040.0);
        assert!(result.methodology.contains("Density"));
        assert_eq!(result.quality.data_completeness, 1.0);
        assert_eq!(result.statistics.valid_count, 5);
    }

    #[test]
    fn compute_every_enabled_type_on_a_full_well() {
        let well = make_well();
        let params = CalculationParameters::default();
        for calc_type in CalculationType::ALL {
            let result = compute(&well, calc_type, &params);
            assert!(result.is_ok(), "{calc_type} failed: {:?}", result.err());
        }
    }

    #[test]
    fn missing_curve_is_a_structural_error() {
        let well = WellLogData::new("EMPTY-1", (0.0, 100.0), Vec::new());
        let params = CalculationParameters::default();
        let err = compute(&well, CalculationType::ShaleVolume, &params).unwrap_err();
        assert!(matches!(err, CalcError::MissingCurve { curve: "GR", .. }));
    }

    #[test]
    fn blocked_validation_is_a_fatal_error() {
        let well = make_well();
        let params = CalculationParameters {
            gr_clean: 150.0,
            gr_shale: 100.0,
            ..CalculationParameters::default()
        };
        let err = compute(&well, CalculationType::ShaleVolume, &params).unwrap_err();
        assert!(matches!(err, CalcError::InvalidParameters { .. }));
    }

    #[test]
    fn unknown_method_is_fatal() {
        let well = make_well();
        let params = CalculationParameters {
            porosity_method: "sonic".to_string(),
            ..CalculationParameters::default()
        };
        let err = compute(&well, CalculationType::Porosity, &params).unwrap_err();
        assert!(matches!(err, CalcError::UnknownMethod { .. }));
    }

    #[test]
    fn nphi_method_scenario() {
        let well = WellLogData::new(
            "TEST-2",
            (1000.0, 1004.0),
            vec![LogCurve::from_raw(
                "NPHI",
                "%",
                &[0.0, 10.0, 20.0, 30.0, 40.0],
                CurveQuality::Good,
            )],
        );
        let params = CalculationParameters {
            porosity_method: "nphi".to_string(),
            ..CalculationParameters::default()
        };
        let result = compute(&well, CalculationType::Porosity, &params).expect("computes");
        let values: Vec<f64> = result.values.iter().map(|v| v.expect("present")).collect();
        for (got, want) in values.iter().zip([0.0, 0.1, 0.2, 0.3, 0.4]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn permeability_uses_geometric_mean_and_caps_confidence() {
        let well = make_well();
        let params = CalculationParameters::default();
        let result = compute(&well, CalculationType::Permeability, &params).expect("computes");
        assert!(
            result.quality.confidence <= crate::types::ConfidenceLevel::Medium,
            "permeability confidence must never be HIGH"
        );
        // Geometric mean of a spread series sits below the arithmetic mean
        let valid: Vec<f64> = result.values.iter().filter_map(|v| *v).collect();
        let arith = valid.iter().sum::<f64>() / valid.len() as f64;
        assert!(result.statistics.mean <= arith);
    }

    #[test]
    fn saturation_falls_back_to_neutron_porosity() {
        let n = 3;
        let well = WellLogData::new(
            "TEST-3",
            (1000.0, 1002.0),
            vec![
                LogCurve::from_raw("NPHI", "%", &[25.0, 25.0, 25.0], CurveQuality::Good),
                LogCurve::from_raw("RT", "ohm.m", &[8.0, 16.0, 32.0], CurveQuality::Good),
            ],
        );
        let params = CalculationParameters::default();
        let result = compute(&well, CalculationType::Saturation, &params).expect("computes");
        assert_eq!(result.values.len(), n);
        assert!(result.values.iter().all(|v| v.is_some()));
    }

    #[test]
    fn poor_input_quality_degrades_result_confidence() {
        let mut well = make_well();
        for curve in &mut well.curves {
            curve.quality = CurveQuality::Poor;
        }
        let params = CalculationParameters::default();
        let result = compute(&well, CalculationType::Porosity, &params).expect("computes");
        assert!(result.quality.confidence < crate::types::ConfidenceLevel::High);
    }

    #[test]
    fn incomplete_data_widens_uncertainty() {
        let well = WellLogData::new(
            "TEST-4",
            (1000.0, 1009.0),
            vec![LogCurve::from_raw(
                "GR",
                "API",
                // 4 of 10 valid - completeness 0.4
                &[
                    80.0,
                    crate::types::WIRE_NULL,
                    crate::types::WIRE_NULL,
                    90.0,
                    crate::types::WIRE_NULL,
                    crate::types::WIRE_NULL,
                    100.0,
                    crate::types::WIRE_NULL,
                    crate::types::WIRE_NULL,
                    110.0,
                ],
                CurveQuality::Good,
            )],
        );
        let params = CalculationParameters::default();
        let result = compute(&well, CalculationType::ShaleVolume, &params).expect("computes");
        let (lo, hi) = result.quality.uncertainty_range;
        let base = ShaleMethod::LarionovTertiary.uncertainty_band();
        assert!((lo - base.lo * 1.5).abs() < 1e-12, "band must widen 1.5x");
        assert!((hi - base.hi * 1.5).abs() < 1e-12);
    }
}
