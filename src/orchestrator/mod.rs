//! Update orchestrator - the stateful coordinator between parameter edits
//! and calculation results.
//!
//! ```text
//! edit received   -> change detector -> eager cache invalidation
//!                 -> auto mode: (re)arm debounce | manual mode: record
//! debounce fires  -> for each enabled type x well:
//! / manual trigger     cache lookup -> on miss: mark in-flight, compute,
//!                      clear in-flight, per-item event
//!                 -> batch-complete event
//! ```
//!
//! Single-threaded cooperative model: all mutations funnel through the
//! transition methods below, with `Instant`s injected so the machine is
//! testable without a timer or an executor. A later edit never cancels an
//! in-flight batch - stale results are allowed to finish and are then
//! superseded by the next invalidation.

pub mod debounce;
pub mod driver;

pub use debounce::DebounceTimer;
pub use driver::{run_update_loop, EngineCommand};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::{self, CacheEntry, CacheStats, CalculationCache};
use crate::calc_engine;
use crate::change_detector;
use crate::config::EngineConfig;
use crate::types::{
    BatchResults, CalculationParameters, CalculationType, EngineEvent, ParameterChange,
    WellLogData,
};

/// The coordinator. Owns the cache, the debounce timer, the last-seen
/// parameter set, and the subscriber list.
pub struct UpdateOrchestrator {
    config: EngineConfig,
    wells: Vec<WellLogData>,
    cache: CalculationCache,
    last_parameters: CalculationParameters,
    debounce: DebounceTimer,
    /// Manual mode: changes recorded, recompute deferred to a trigger
    pending_manual: bool,
    /// Item keys currently computing ("well:type")
    in_flight: HashSet<String>,
    subscribers: Vec<mpsc::UnboundedSender<EngineEvent>>,
    batches_run: u64,
    items_computed: u64,
    items_failed: u64,
}

impl UpdateOrchestrator {
    pub fn new(
        config: EngineConfig,
        wells: Vec<WellLogData>,
        initial_parameters: CalculationParameters,
    ) -> Self {
        info!(
            wells = wells.len(),
            enabled = config.enabled_calculations.len(),
            auto_update = config.auto_update,
            "Initializing update orchestrator"
        );
        let cache = CalculationCache::new(config.cache_timeout());
        let debounce = DebounceTimer::new(config.debounce());
        Self {
            config,
            wells,
            cache,
            last_parameters: initial_parameters,
            debounce,
            pending_manual: false,
            in_flight: HashSet::new(),
            subscribers: Vec::new(),
            batches_run: 0,
            items_computed: 0,
            items_failed: 0,
        }
    }

    /// Subscribe to engine events. Closed receivers are pruned on the
    /// next send.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Replace the well set. Every cached result is stale afterwards.
    pub fn load_wells(&mut self, wells: Vec<WellLogData>) {
        info!(wells = wells.len(), "Well set replaced - clearing cache");
        self.wells = wells;
        self.cache.clear();
        let stats = self.cache.stats();
        self.emit(EngineEvent::CacheUpdate(stats));
    }

    pub fn parameters(&self) -> &CalculationParameters {
        &self.last_parameters
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Whether a manual-mode recompute is waiting for a trigger.
    pub fn has_pending_changes(&self) -> bool {
        self.pending_manual
    }

    /// Items currently computing. Non-zero only while a batch is running.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Feed one parameter edit into the machine.
    ///
    /// Runs the change detector, eagerly invalidates stale cache entries,
    /// publishes the diff, and either (re)arms the debounce (auto) or
    /// records the pending change (manual). Returns the detected changes.
    pub fn handle_parameter_edit(
        &mut self,
        new_parameters: CalculationParameters,
        now: Instant,
    ) -> Vec<ParameterChange> {
        let changes = change_detector::detect_all(
            &self.config.enabled_calculations,
            &self.last_parameters,
            &new_parameters,
        );
        // The full record always becomes current - method switches reach
        // the calculators through the cache key even without a diff.
        self.last_parameters = new_parameters;

        if changes.is_empty() {
            return changes;
        }

        debug!(count = changes.len(), "Parameter edit detected");
        self.emit(EngineEvent::ParameterChanges(changes.clone()));

        // Eager invalidation, before any recompute is scheduled
        let stale: HashSet<CalculationType> = changes.iter().map(|c| c.calc_type).collect();
        for calc_type in stale {
            if self.cache.invalidate_type(calc_type) > 0 {
                let stats = self.cache.stats();
                self.emit(EngineEvent::CacheUpdate(stats));
            }
        }

        if self.config.auto_update {
            self.debounce.arm(now);
        } else {
            self.pending_manual = true;
        }

        changes
    }

    /// Advance the machine: run a batch if the debounce window has
    /// elapsed. Drivers call this from their poll loop.
    pub fn tick(&mut self, now: Instant) -> Option<BatchResults> {
        if self.debounce.fire_due(now) {
            debug!("Debounce window elapsed - starting batch");
            return Some(self.run_batch(now));
        }
        None
    }

    /// Explicit recompute, regardless of mode. Cancels any armed debounce
    /// so the same edit burst is not computed twice.
    pub fn trigger_update(&mut self, now: Instant) -> BatchResults {
        self.debounce.cancel();
        self.pending_manual = false;
        self.run_batch(now)
    }

    /// Run one batch: every enabled calculation type across every well,
    /// in scheduling order. Per-item failures are surfaced and skipped -
    /// one bad well must not block unrelated results.
    fn run_batch(&mut self, now: Instant) -> BatchResults {
        let enabled = self.config.enabled_calculations.clone();
        let params = self.last_parameters.clone();
        let mut results: BatchResults = HashMap::new();

        for &calc_type in &enabled {
            for well_index in 0..self.wells.len() {
                let well_name = self.wells[well_index].name.clone();
                let item_key = format!("{well_name}:{calc_type}");

                // Resolve inputs and fingerprints; a missing curve fails
                // just this item
                let fingerprints = {
                    let well = &self.wells[well_index];
                    calc_engine::input_curves(well, calc_type, &params).map(|curves| {
                        (
                            cache::cache_key(&well.name, calc_type, &params, &curves),
                            cache::parameter_fingerprint(calc_type, &params),
                            cache::curve_fingerprint(&curves),
                        )
                    })
                };
                let (key, parameter_fingerprint, curve_fingerprint) = match fingerprints {
                    Ok(f) => f,
                    Err(e) => {
                        self.fail_item(&well_name, calc_type, &e.to_string());
                        continue;
                    }
                };

                // Cache consultation (lazy TTL expiry happens here)
                let expirations_before = self.cache.stats().expirations;
                if let Some(result) = self.cache.get(&key, now) {
                    results.entry(calc_type).or_default().push(result);
                    continue;
                }
                if self.cache.stats().expirations > expirations_before {
                    let stats = self.cache.stats();
                    self.emit(EngineEvent::CacheUpdate(stats));
                }

                // Miss: compute with in-flight tracking
                self.in_flight.insert(item_key.clone());
                let outcome = {
                    let well = &self.wells[well_index];
                    calc_engine::compute(well, calc_type, &params)
                };
                self.in_flight.remove(&item_key);

                match outcome {
                    Ok(result) => {
                        let result = Arc::new(result);
                        self.cache.insert(CacheEntry {
                            key,
                            calc_type,
                            result: Arc::clone(&result),
                            parameter_fingerprint,
                            curve_fingerprint,
                            inserted_at: now,
                        });
                        let stats = self.cache.stats();
                        self.emit(EngineEvent::CacheUpdate(stats));
                        self.emit(EngineEvent::ItemComplete {
                            well: well_name.clone(),
                            calc_type,
                            result: Arc::clone(&result),
                        });
                        self.items_computed += 1;
                        results.entry(calc_type).or_default().push(result);
                    }
                    Err(e) => {
                        self.fail_item(&well_name, calc_type, &e.to_string());
                    }
                }
            }
        }

        self.batches_run += 1;
        info!(
            batch = self.batches_run,
            types = results.len(),
            computed = self.items_computed,
            failed = self.items_failed,
            "Batch complete"
        );
        self.emit(EngineEvent::BatchComplete(results.clone()));
        results
    }

    fn fail_item(&mut self, well: &str, calc_type: CalculationType, error: &str) {
        warn!(well, calc_type = %calc_type, error, "Calculation item failed");
        self.items_failed += 1;
        self.emit(EngineEvent::ItemFailed {
            well: well.to_string(),
            calc_type,
            error: error.to_string(),
        });
    }

    /// Fan an event out to all live subscribers, pruning closed ones.
    fn emit(&mut self, event: EngineEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CurveQuality, LogCurve};
    use std::time::Duration;

    fn make_well(name: &str) -> WellLogData {
        let n = 10;
        let rhob: Vec<f64> = (0..n).map(|i| 2.2 + 0.04 * i as f64).collect();
        let nphi: Vec<f64> = (0..n).map(|i| 30.0 - 1.5 * i as f64).collect();
        let gr: Vec<f64> = (0..n).map(|i| 30.0 + 12.0 * i as f64).collect();
        let rt: Vec<f64> = (0..n).map(|i| 4.0 + 2.0 * i as f64).collect();
        WellLogData::new(
            name,
            (2000.0, 2090.0),
            vec![
                LogCurve::from_raw("RHOB", "g/cc", &rhob, CurveQuality::Good),
                LogCurve::from_raw("NPHI", "%", &nphi, CurveQuality::Good),
                LogCurve::from_raw("GR", "API", &gr, CurveQuality::Good),
                LogCurve::from_raw("RT", "ohm.m", &rt, CurveQuality::Good),
            ],
        )
    }

    fn make_orchestrator(auto_update: bool) -> UpdateOrchestrator {
        let config = EngineConfig {
            auto_update,
            ..EngineConfig::default()
        };
        UpdateOrchestrator::new(
            config,
            vec![make_well("WELL-A")],
            CalculationParameters::default(),
        )
    }

    #[test]
    fn debounce_coalesces_an_edit_burst_into_one_batch() {
        let mut orch = make_orchestrator(true);
        let t0 = Instant::now();

        // Three edits of matrix_density inside one debounce window
        for (offset_ms, density) in [(0u64, 2.68), (200, 2.70), (400, 2.71)] {
            let params = CalculationParameters {
                matrix_density: density,
                ..CalculationParameters::default()
            };
            let changes =
                orch.handle_parameter_edit(params, t0 + Duration::from_millis(offset_ms));
            assert_eq!(changes.len(), 1);
        }

        // Window measured from the last edit: nothing fires at +1400ms
        // (400 + 1200 = 1600)
        assert!(orch.tick(t0 + Duration::from_millis(1400)).is_none());

        let results = orch
            .tick(t0 + Duration::from_millis(1600))
            .expect("debounce elapsed");
        assert_eq!(results.len(), 4, "all four types computed");

        // Exactly one batch - a second tick has nothing to do
        assert!(orch.tick(t0 + Duration::from_millis(3000)).is_none());
        assert_eq!(orch.batches_run, 1);
    }

    #[test]
    fn manual_mode_records_but_does_not_schedule() {
        let mut orch = make_orchestrator(false);
        let t0 = Instant::now();

        let params = CalculationParameters {
            gr_shale: 180.0,
            ..CalculationParameters::default()
        };
        let changes = orch.handle_parameter_edit(params, t0);
        assert_eq!(changes.len(), 1);
        assert!(orch.has_pending_changes());

        // No debounce armed - ticks do nothing
        assert!(orch.tick(t0 + Duration::from_secs(60)).is_none());

        // Explicit trigger runs the batch and clears the pending flag
        let results = orch.trigger_update(t0 + Duration::from_secs(61));
        assert!(!results.is_empty());
        assert!(!orch.has_pending_changes());
    }

    #[test]
    fn cache_round_trip_returns_identical_arc() {
        let mut orch = make_orchestrator(true);
        let t0 = Instant::now();

        let first = orch.trigger_update(t0);
        let second = orch.trigger_update(t0 + Duration::from_millis(10));

        let a = &first[&CalculationType::Porosity][0];
        let b = &second[&CalculationType::Porosity][0];
        assert!(
            Arc::ptr_eq(a, b),
            "unchanged parameters must serve the cached allocation"
        );
        assert_eq!(orch.items_computed, 4, "second batch must be all hits");
    }

    #[test]
    fn recompute_after_invalidation_is_value_equal() {
        let mut orch = make_orchestrator(true);
        let t0 = Instant::now();

        let first = orch.trigger_update(t0);

        // Edit away and back - cache for porosity is invalidated twice,
        // parameters end up identical to the original
        orch.handle_parameter_edit(
            CalculationParameters {
                matrix_density: 2.71,
                ..CalculationParameters::default()
            },
            t0 + Duration::from_millis(10),
        );
        orch.handle_parameter_edit(
            CalculationParameters::default(),
            t0 + Duration::from_millis(20),
        );

        let second = orch.trigger_update(t0 + Duration::from_millis(30));
        let a = &first[&CalculationType::Porosity][0];
        let b = &second[&CalculationType::Porosity][0];
        assert!(!Arc::ptr_eq(a, b), "invalidation forces a fresh computation");
        assert_eq!(a.values, b.values, "same parameters, same values");
    }

    #[test]
    fn parameter_edit_eagerly_invalidates_only_the_stale_type() {
        let mut orch = make_orchestrator(true);
        let t0 = Instant::now();
        orch.trigger_update(t0);
        assert_eq!(orch.cache_stats().entries, 4);

        orch.handle_parameter_edit(
            CalculationParameters {
                gr_clean: 30.0,
                ..CalculationParameters::default()
            },
            t0 + Duration::from_millis(10),
        );
        let stats = orch.cache_stats();
        assert_eq!(stats.entries, 3, "only shale_volume entries dropped");
        assert_eq!(stats.invalidations, 1);
    }

    #[test]
    fn failed_item_does_not_block_siblings() {
        let config = EngineConfig {
            enabled_calculations: vec![CalculationType::ShaleVolume],
            ..EngineConfig::default()
        };
        // WELL-B has no GR curve - its shale volume item must fail alone
        let bare = WellLogData::new("WELL-B", (0.0, 100.0), Vec::new());
        let mut orch = UpdateOrchestrator::new(
            config,
            vec![make_well("WELL-A"), bare],
            CalculationParameters::default(),
        );
        let mut events = orch.subscribe();

        let results = orch.trigger_update(Instant::now());
        assert_eq!(results[&CalculationType::ShaleVolume].len(), 1);
        assert_eq!(orch.items_failed, 1);

        let mut saw_failure = false;
        let mut saw_completion = false;
        while let Ok(event) = events.try_recv() {
            match event {
                EngineEvent::ItemFailed { well, .. } => {
                    assert_eq!(well, "WELL-B");
                    saw_failure = true;
                }
                EngineEvent::ItemComplete { well, .. } => {
                    assert_eq!(well, "WELL-A");
                    saw_completion = true;
                }
                _ => {}
            }
        }
        assert!(saw_failure && saw_completion);
    }

    #[test]
    fn events_fire_in_contract_order() {
        let mut orch = make_orchestrator(true);
        let mut events = orch.subscribe();
        let t0 = Instant::now();

        orch.trigger_update(t0);
        orch.handle_parameter_edit(
            CalculationParameters {
                rw: 0.05,
                ..CalculationParameters::default()
            },
            t0 + Duration::from_millis(10),
        );

        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            kinds.push(match event {
                EngineEvent::ParameterChanges(_) => "changes",
                EngineEvent::ItemComplete { .. } => "item",
                EngineEvent::ItemFailed { .. } => "failed",
                EngineEvent::BatchComplete(_) => "batch",
                EngineEvent::CacheUpdate(_) => "cache",
            });
        }
        // Batch: (cache, item) x4, batch-complete; then the edit:
        // changes before the invalidation's cache update
        let changes_pos = kinds.iter().position(|k| *k == "changes").expect("emitted");
        let batch_pos = kinds.iter().position(|k| *k == "batch").expect("emitted");
        assert!(batch_pos < changes_pos);
        assert_eq!(kinds.last(), Some(&"cache"), "invalidation emits last");
    }

    #[test]
    fn method_switch_recomputes_via_cache_miss() {
        let mut orch = make_orchestrator(true);
        let t0 = Instant::now();
        orch.trigger_update(t0);

        // Method-only edit: no diff, no invalidation, but the key changes
        let changes = orch.handle_parameter_edit(
            CalculationParameters {
                shale_method: "clavier".to_string(),
                ..CalculationParameters::default()
            },
            t0 + Duration::from_millis(10),
        );
        assert!(changes.is_empty(), "method strings are not watched fields");

        let results = orch.trigger_update(t0 + Duration::from_millis(20));
        let result = &results[&CalculationType::ShaleVolume][0];
        assert!(result.methodology.contains("Clavier"));
        // 4 initial computes + 1 clavier compute
        assert_eq!(orch.items_computed, 5);
    }

    #[test]
    fn ttl_expiry_forces_recompute() {
        let config = EngineConfig {
            cache_timeout_ms: 100,
            ..EngineConfig::default()
        };
        let mut orch = UpdateOrchestrator::new(
            config,
            vec![make_well("WELL-A")],
            CalculationParameters::default(),
        );
        let t0 = Instant::now();
        orch.trigger_update(t0);
        assert_eq!(orch.items_computed, 4);

        // Past the TTL every entry expires lazily on lookup
        orch.trigger_update(t0 + Duration::from_millis(200));
        assert_eq!(orch.items_computed, 8);
        assert_eq!(orch.cache_stats().expirations, 4);
    }

    #[test]
    fn load_wells_clears_the_cache() {
        let mut orch = make_orchestrator(true);
        orch.trigger_update(Instant::now());
        assert!(orch.cache_stats().entries > 0);

        orch.load_wells(vec![make_well("WELL-C")]);
        assert_eq!(orch.cache_stats().entries, 0);
    }
}
