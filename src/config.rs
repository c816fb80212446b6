//! Engine configuration: enabled calculations, auto-update, cache TTL,
//! debounce window.
//!
//! TOML loading uses a two-pass approach: first walk the raw key tree and
//! warn on unknown keys with "did you mean?" suggestions, then deserialize
//! with serde. Warnings never break an existing config file.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::CalculationType;

// ============================================================================
// Defaults
// ============================================================================

pub mod defaults {
    /// Debounce window for coalescing rapid parameter edits (ms).
    pub const DEBOUNCE_MS: u64 = 1200;

    /// Cache entry time-to-live (ms).
    pub const CACHE_TIMEOUT_MS: u64 = 300_000;

    /// Poll interval of the async update-loop driver (ms).
    pub const DRIVER_POLL_MS: u64 = 50;
}

/// Errors loading a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " — did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// EngineConfig
// ============================================================================

/// The engine's configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which calculations batches run, in scheduling order
    pub enabled_calculations: Vec<CalculationType>,
    /// Auto mode recomputes after the debounce window; manual mode waits
    /// for an explicit trigger
    pub auto_update: bool,
    /// Cache entry time-to-live, ms
    pub cache_timeout_ms: u64,
    /// Debounce window for coalescing edits, ms
    pub debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled_calculations: CalculationType::ALL.to_vec(),
            auto_update: true,
            cache_timeout_ms: defaults::CACHE_TIMEOUT_MS,
            debounce_ms: defaults::DEBOUNCE_MS,
        }
    }
}

impl EngineConfig {
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Parse a TOML string, collecting unknown-key warnings.
    ///
    /// Fails only on syntax/type errors or on values [`validate`] rejects;
    /// unknown keys warn.
    pub fn from_toml_str(raw: &str) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let mut warnings = validate_unknown_keys(raw);
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let (errors, range_warnings) = config.validate();
        if let Some(first) = errors.first() {
            return Err(ConfigError::Invalid(first.clone()));
        }
        warnings.extend(range_warnings);
        Ok((config, warnings))
    }

    /// Range checks. Errors are impossible values; warnings are
    /// suspicious but workable.
    pub fn validate(&self) -> (Vec<String>, Vec<ConfigWarning>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.cache_timeout_ms == 0 {
            errors.push("cache_timeout_ms = 0 would evict every entry on first lookup".to_string());
        }

        if self.enabled_calculations.is_empty() {
            warnings.push(ConfigWarning {
                field: "enabled_calculations".to_string(),
                message: "no calculations enabled - batches will produce nothing".to_string(),
                suggestion: None,
            });
        }

        let unique: HashSet<_> = self.enabled_calculations.iter().collect();
        if unique.len() != self.enabled_calculations.len() {
            warnings.push(ConfigWarning {
                field: "enabled_calculations".to_string(),
                message: "duplicate entries in enabled_calculations - each runs once per batch"
                    .to_string(),
                suggestion: None,
            });
        }

        // Debounce beyond 10s makes the UI feel broken
        if self.debounce_ms > 10_000 {
            warnings.push(ConfigWarning {
                field: "debounce_ms".to_string(),
                message: format!(
                    "debounce_ms = {} is unusually long (typical: 1000-1500)",
                    self.debounce_ms
                ),
                suggestion: None,
            });
        }

        (errors, warnings)
    }
}

// ============================================================================
// Unknown-key validation
// ============================================================================

/// Valid dotted key paths for EngineConfig.
///
/// Maintained manually to match the struct; any new field must be added
/// here too.
fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        "enabled_calculations",
        "auto_update",
        "cache_timeout_ms",
        "debounce_ms",
    ];
    keys.iter().copied().collect()
}

/// Recursively collect dotted key paths from a TOML value tree.
fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

/// Levenshtein edit distance, for typo suggestions.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Closest known key within edit distance 3, if any.
fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= 3 {
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((k, dist)),
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

/// Warn for any unknown keys in a raw TOML string. Parse errors are left
/// for serde to report.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ConfigWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            warnings.push(ConfigWarning {
                field: key.clone(),
                message: format!("Unknown config key '{key}'"),
                suggestion: suggest_correction(key, &known),
            });
        }
    }

    warnings
}
