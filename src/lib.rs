//! Petrocalc: petrophysical calculation engine
//!
//! Derives porosity, shale volume, water saturation, and permeability from
//! raw well-log curves, and keeps the derived results consistent with a
//! live-editable parameter set without recomputing work that has not
//! changed.
//!
//! ## Architecture
//!
//! - **Calculation Engine**: pure formula modules with validation,
//!   uncertainty, and statistics (`calc_engine`)
//! - **Calculation Cache**: TTL-bounded result store with hit/miss
//!   telemetry (`cache`)
//! - **Change Detector**: field-level parameter diffs per calculation
//!   type (`change_detector`)
//! - **Update Orchestrator**: debounce, auto/manual triggering, batch
//!   sequencing, event publishing (`orchestrator`)

pub mod cache;
pub mod calc_engine;
pub mod change_detector;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod types;

// Re-export engine configuration
pub use config::{ConfigWarning, EngineConfig};

// Re-export commonly used types
pub use types::{
    BatchResults, CalculationParameters, CalculationResult, CalculationType, ConfidenceLevel,
    CurveQuality, EngineEvent, LogCurve, ParameterChange, QualityMetrics, StatisticalSummary,
    WellLogData,
};

// Re-export the error taxonomy
pub use error::CalcError;

// Re-export validation surface
pub use calc_engine::{Severity, ValidationIssue, ValidationReport};

// Re-export cache telemetry
pub use cache::{CacheStats, CalculationCache};

// Re-export the orchestrator
pub use orchestrator::{run_update_loop, EngineCommand, UpdateOrchestrator};
