//! Calculation result cache with TTL expiry and telemetry.
//!
//! Keyed by an MD5 digest of (well, calculation type, method, parameter
//! fingerprint, curve fingerprint). Entry lifecycle:
//!
//! ```text
//! absent -> cached -> (expired | invalidated) -> absent
//! ```
//!
//! TTL eviction is lazy - checked on lookup, not by a background sweep, so
//! no scheduler is needed. Invalidation by parameter change is eager: the
//! orchestrator deletes all entries for a calculation type the instant a
//! relevant field changes, before any recompute is scheduled.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{CalculationParameters, CalculationResult, CalculationType, LogCurve};

// ============================================================================
// Fingerprints
// ============================================================================

/// Digest of the parameter fields one calculation type depends on: the
/// watched fields plus the method string. Editing an unrelated field
/// leaves the fingerprint (and so the key) untouched.
pub fn parameter_fingerprint(calc_type: CalculationType, params: &CalculationParameters) -> String {
    let mut ctx = md5::Context::new();
    ctx.consume(calc_type.as_str().as_bytes());
    ctx.consume(params.method_str(calc_type).as_bytes());
    for field in CalculationParameters::watched_fields(calc_type) {
        ctx.consume(field.as_bytes());
        if let Some(value) = params.field_value(field) {
            ctx.consume(value.to_le_bytes());
        }
    }
    format!("{:x}", ctx.compute())
}

/// Digest of the input curves an item reads: name, length, and sample
/// bits. Absent samples hash as a marker byte so `None` and `Some(0.0)`
/// differ.
pub fn curve_fingerprint(curves: &[&LogCurve]) -> String {
    let mut ctx = md5::Context::new();
    for curve in curves {
        ctx.consume(curve.name.as_bytes());
        ctx.consume((curve.samples.len() as u64).to_le_bytes());
        for sample in &curve.samples {
            match sample {
                Some(v) => ctx.consume(v.to_le_bytes()),
                None => ctx.consume([0xFFu8]),
            }
        }
    }
    format!("{:x}", ctx.compute())
}

/// Compose the full cache key for one (well, type) item.
pub fn cache_key(
    well_name: &str,
    calc_type: CalculationType,
    params: &CalculationParameters,
    curves: &[&LogCurve],
) -> String {
    let digest = md5::compute(format!(
        "{}:{}:{}:{}:{}",
        well_name,
        calc_type.as_str(),
        params.method_str(calc_type),
        parameter_fingerprint(calc_type, params),
        curve_fingerprint(curves),
    ));
    format!("{digest:x}")
}

// ============================================================================
// Cache
// ============================================================================

/// One cached result with the provenance needed for invalidation.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub calc_type: CalculationType,
    pub result: Arc<CalculationResult>,
    pub parameter_fingerprint: String,
    pub curve_fingerprint: String,
    pub inserted_at: Instant,
}

/// Hit/miss accounting exposed for telemetry display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub invalidations: u64,
}

impl CacheStats {
    /// Hits over lookups, 0 when nothing has been looked up yet.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }
}

/// Time-bounded result store. Single-writer by construction: keys are
/// unique per (well, type, fingerprints), so no two batch items ever
/// write the same key concurrently.
#[derive(Debug)]
pub struct CalculationCache {
    entries: HashMap<String, CacheEntry>,
    timeout: Duration,
    hits: u64,
    misses: u64,
    expirations: u64,
    invalidations: u64,
}

impl CalculationCache {
    pub fn new(timeout: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            timeout,
            hits: 0,
            misses: 0,
            expirations: 0,
            invalidations: 0,
        }
    }

    /// Look up a key, lazily evicting it first if its TTL has passed.
    pub fn get(&mut self, key: &str, now: Instant) -> Option<Arc<CalculationResult>> {
        let expired = match self.entries.get(key) {
            Some(entry) => now.duration_since(entry.inserted_at) > self.timeout,
            None => {
                self.misses += 1;
                return None;
            }
        };
        if expired {
            self.entries.remove(key);
            self.expirations += 1;
            self.misses += 1;
            debug!(key, "cache entry expired");
            return None;
        }
        self.hits += 1;
        self.entries.get(key).map(|e| Arc::clone(&e.result))
    }

    /// Append-or-replace. A later batch's write to the same key is
    /// authoritative over an earlier one's (last-write-wins by insertion
    /// time).
    pub fn insert(&mut self, entry: CacheEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    /// Eagerly drop every entry of one calculation type. Returns the
    /// number of entries removed.
    pub fn invalidate_type(&mut self, calc_type: CalculationType) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.calc_type != calc_type);
        let removed = before - self.entries.len();
        self.invalidations += removed as u64;
        if removed > 0 {
            debug!(calc_type = %calc_type, removed, "cache invalidated by parameter change");
        }
        removed
    }

    /// Drop everything (well set replaced).
    pub fn clear(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        self.invalidations += removed as u64;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            expirations: self.expirations,
            invalidations: self.invalidations,
        }
    }
}
