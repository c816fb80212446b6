//! Calculation parameters and the calculation-type vocabulary.
//!
//! `CalculationParameters` is a flat record: every recognized field for
//! every calculation type lives here with its industry default, merged once
//! at the call boundary. Calculators never carry hidden instance state.

use serde::{Deserialize, Serialize};

/// The four derived-property calculations the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    Porosity,
    ShaleVolume,
    Saturation,
    Permeability,
}

impl CalculationType {
    /// All types in the order batches schedule them.
    pub const ALL: [CalculationType; 4] = [
        Self::Porosity,
        Self::ShaleVolume,
        Self::Saturation,
        Self::Permeability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Porosity => "porosity",
            Self::ShaleVolume => "shale_volume",
            Self::Saturation => "saturation",
            Self::Permeability => "permeability",
        }
    }
}

impl std::fmt::Display for CalculationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CalculationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "porosity" => Ok(Self::Porosity),
            "shale_volume" => Ok(Self::ShaleVolume),
            "saturation" => Ok(Self::Saturation),
            "permeability" => Ok(Self::Permeability),
            other => Err(format!("unknown calculation type '{other}'")),
        }
    }
}

/// Flat, live-editable calculation configuration.
///
/// Numeric fields are user-entered discrete values; staleness comparison
/// uses strict inequality, no epsilon. Method-selection strings are parsed
/// by the calculators (`FromStr`) and reach the cache through the key, not
/// through the change detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationParameters {
    // === Porosity ===
    /// Matrix density, g/cc (quartz sandstone default)
    pub matrix_density: f64,
    /// Fluid density, g/cc (fresh mud filtrate default)
    pub fluid_density: f64,
    /// density | neutron (nphi) | effective | total
    pub porosity_method: String,

    // === Shale volume ===
    /// Clean-sand GR baseline, API
    pub gr_clean: f64,
    /// Shale GR baseline, API
    pub gr_shale: f64,
    /// linear | larionov_tertiary | larionov_pre_tertiary | clavier
    pub shale_method: String,

    // === Saturation (Archie) ===
    /// Formation water resistivity, ohm.m
    pub rw: f64,
    /// Tortuosity factor
    pub a: f64,
    /// Cementation exponent
    pub m: f64,
    /// Saturation exponent
    pub n: f64,
    /// archie
    pub saturation_method: String,

    // === Permeability ===
    /// Median grain size, mm (Kozeny-Carman)
    pub grain_size: f64,
    /// Irreducible water saturation default when no Swi curve is supplied
    pub swi: f64,
    /// Coates-Dumanoir coefficient
    pub perm_c: f64,
    /// Coates-Dumanoir porosity exponent
    pub perm_x: f64,
    /// Coates-Dumanoir saturation exponent
    pub perm_y: f64,
    /// kozeny_carman | timur | coates_dumanoir
    pub permeability_method: String,
}

impl Default for CalculationParameters {
    fn default() -> Self {
        Self {
            matrix_density: 2.65,
            fluid_density: 1.0,
            porosity_method: "density".to_string(),
            gr_clean: 25.0,
            gr_shale: 150.0,
            shale_method: "larionov_tertiary".to_string(),
            rw: 0.1,
            a: 1.0,
            m: 2.0,
            n: 2.0,
            saturation_method: "archie".to_string(),
            grain_size: 0.25,
            swi: 0.25,
            perm_c: 10000.0,
            perm_x: 4.0,
            perm_y: 2.0,
            permeability_method: "timur".to_string(),
        }
    }
}

impl CalculationParameters {
    /// Fixed list of fields the change detector compares for a type.
    ///
    /// Only these fields mark cached results of that type stale; the method
    /// strings are part of the cache key instead.
    pub fn watched_fields(calc_type: CalculationType) -> &'static [&'static str] {
        match calc_type {
            CalculationType::Porosity => &["matrix_density", "fluid_density"],
            CalculationType::ShaleVolume => &["gr_clean", "gr_shale"],
            CalculationType::Saturation => &["rw", "a", "m", "n"],
            CalculationType::Permeability => &["grain_size", "swi"],
        }
    }

    /// Value of a watched field by name. Returns `None` for names outside
    /// the watched lists.
    pub fn field_value(&self, name: &str) -> Option<f64> {
        match name {
            "matrix_density" => Some(self.matrix_density),
            "fluid_density" => Some(self.fluid_density),
            "gr_clean" => Some(self.gr_clean),
            "gr_shale" => Some(self.gr_shale),
            "rw" => Some(self.rw),
            "a" => Some(self.a),
            "m" => Some(self.m),
            "n" => Some(self.n),
            "grain_size" => Some(self.grain_size),
            "swi" => Some(self.swi),
            _ => None,
        }
    }

    /// The method-selection string for a type, as entered.
    pub fn method_str(&self, calc_type: CalculationType) -> &str {
        match calc_type {
            CalculationType::Porosity => &self.porosity_method,
            CalculationType::ShaleVolume => &self.shale_method,
            CalculationType::Saturation => &self.saturation_method,
            CalculationType::Permeability => &self.permeability_method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculation_type_round_trips_through_str() {
        for t in CalculationType::ALL {
            let parsed: CalculationType = t.as_str().parse().expect("round trip");
            assert_eq!(parsed, t);
        }
    }

    #[test]
    fn watched_fields_resolve_to_values() {
        let params = CalculationParameters::default();
        for t in CalculationType::ALL {
            for field in CalculationParameters::watched_fields(t) {
                assert!(
                    params.field_value(field).is_some(),
                    "watched field '{field}' must resolve"
                );
            }
        }
    }

    #[test]
    fn defaults_match_industry_values() {
        let params = CalculationParameters::default();
        assert_eq!(params.matrix_density, 2.65);
        assert_eq!(params.fluid_density, 1.0);
        assert_eq!(params.a, 1.0);
        assert_eq!(params.perm_c, 10000.0);
    }

    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let params: CalculationParameters =
            serde_json::from_str(r#"{"matrix_density": 2.71}"#).expect("partial deserialize");
        assert_eq!(params.matrix_density, 2.71);
        assert_eq!(params.fluid_density, 1.0);
    }
}
