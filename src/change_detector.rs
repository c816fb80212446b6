//! Field-level parameter change detection.
//!
//! Compares only the fields relevant to a calculation type (the fixed
//! watched-field lists) and emits one [`ParameterChange`] per differing
//! field. Comparison is strict inequality - these are user-entered
//! discrete values, not computed floats, so no epsilon tolerance applies.

use crate::types::{CalculationParameters, CalculationType, ParameterChange};

/// Diff one calculation type's watched fields between two parameter sets.
pub fn detect_changes(
    calc_type: CalculationType,
    old: &CalculationParameters,
    new: &CalculationParameters,
) -> Vec<ParameterChange> {
    let mut changes = Vec::new();
    for field in CalculationParameters::watched_fields(calc_type) {
        let (old_value, new_value) = match (old.field_value(field), new.field_value(field)) {
            (Some(o), Some(n)) => (o, n),
            _ => continue,
        };
        if old_value != new_value {
            changes.push(ParameterChange {
                calc_type,
                parameter: (*field).to_string(),
                old_value,
                new_value,
            });
        }
    }
    changes
}

/// Diff every enabled calculation type. Multiple simultaneous field edits
/// yield multiple records in one batch.
pub fn detect_all(
    enabled: &[CalculationType],
    old: &CalculationParameters,
    new: &CalculationParameters,
) -> Vec<ParameterChange> {
    enabled
        .iter()
        .flat_map(|&t| detect_changes(t, old, new))
        .collect()
}
