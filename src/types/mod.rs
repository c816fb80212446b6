//! Shared data model: curves, parameters, results, events.

pub mod curve;
pub mod events;
pub mod parameters;
pub mod result;

pub use curve::{CurveQuality, LogCurve, WellLogData, WIRE_NULL};
pub use events::{BatchResults, EngineEvent, ParameterChange};
pub use parameters::{CalculationParameters, CalculationType};
pub use result::{
    CalculationResult, ConfidenceLevel, Percentiles, QualityMetrics, StatisticalSummary,
};
