//! Fatal error taxonomy for the calculation engine.
//!
//! Only structural problems surface as errors: a missing input curve,
//! mismatched curve lengths, an unknown method name, or parameters that
//! failed validation. Per-sample numerical issues (degenerate porosity,
//! negative radicand, out-of-range input) never error: the affected
//! sample becomes `None` so one bad depth cannot interrupt a curve.

use thiserror::Error;

use crate::types::CalculationType;

/// Errors raised by calculators and the compute dispatch.
#[derive(Error, Debug)]
pub enum CalcError {
    /// A required input curve is not present in the well.
    #[error("well '{well}' has no '{curve}' curve (required for {calc_type})")]
    MissingCurve {
        well: String,
        curve: &'static str,
        calc_type: CalculationType,
    },

    /// Two input curves that must be depth-aligned have different lengths.
    #[error("curve length mismatch: expected {expected} samples, got {actual}")]
    CurveLengthMismatch { expected: usize, actual: usize },

    /// The method string does not name a known calculation method.
    #[error("unknown {calc_type} method '{method}'")]
    UnknownMethod {
        calc_type: CalculationType,
        method: String,
    },

    /// Parameter validation reported at least one blocking error.
    #[error("invalid {calc_type} parameters: {detail}")]
    InvalidParameters {
        calc_type: CalculationType,
        detail: String,
    },
}
