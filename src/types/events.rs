//! Events published by the update orchestrator.
//!
//! Consumers (track renderers, report composers, telemetry panels)
//! subscribe via [`crate::orchestrator::UpdateOrchestrator::subscribe`] and
//! receive these over a tokio mpsc channel. The orchestrator has no
//! knowledge of any UI framework.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::parameters::CalculationType;
use super::result::CalculationResult;
use crate::cache::CacheStats;

/// One field-level parameter edit, as detected by the change detector.
///
/// Multiple simultaneous field edits yield multiple records in one batch -
/// one record per differing field, never one per calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterChange {
    pub calc_type: CalculationType,
    pub parameter: String,
    pub old_value: f64,
    pub new_value: f64,
}

/// Results of one completed batch, keyed by calculation type.
/// Each entry holds one result per well, in scheduling order.
pub type BatchResults = HashMap<CalculationType, Vec<Arc<CalculationResult>>>;

/// Everything the orchestrator tells its subscribers.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Fired once per detected edit, before any recompute is scheduled.
    ParameterChanges(Vec<ParameterChange>),
    /// One (well, type) item finished computing.
    ItemComplete {
        well: String,
        calc_type: CalculationType,
        result: Arc<CalculationResult>,
    },
    /// One (well, type) item failed; siblings continue.
    ItemFailed {
        well: String,
        calc_type: CalculationType,
        error: String,
    },
    /// All items of a batch finished.
    BatchComplete(BatchResults),
    /// Fired after every cache mutation, for hit-rate telemetry.
    CacheUpdate(CacheStats),
}
