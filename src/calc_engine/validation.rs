//! Parameter validation vocabulary shared by the four calculators.
//!
//! Errors (critical/major) block the calculation; warnings (minor) do not.
//! Every issue carries a `suggested_fix` meant for direct display next to
//! the offending parameter field - a UX contract, not optional metadata.

use serde::{Deserialize, Serialize};

/// How bad a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The calculation is undefined or inverted - must block
    Critical,
    /// The calculation would produce misleading output - must block
    Major,
    /// Suspicious but computable - advisory only
    Minor,
}

impl Severity {
    /// Whether an issue at this severity blocks the calculation.
    pub fn blocks(&self) -> bool {
        matches!(self, Self::Critical | Self::Major)
    }
}

/// One validation finding against a single parameter field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Offending parameter field name
    pub parameter: String,
    /// Human-readable description of the problem
    pub message: String,
    pub severity: Severity,
    /// Actionable fix, displayed verbatim next to the field
    pub suggested_fix: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.parameter, self.message, self.suggested_fix)
    }
}

/// Result of validating one calculator's parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Blocking issues (critical/major)
    pub errors: Vec<ValidationIssue>,
    /// Advisory issues (minor)
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Partition issues into errors and warnings by severity.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            issues.into_iter().partition(|i| i.severity.blocks());
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// One-line digest of the blocking errors, for `CalcError` payloads.
    pub fn error_digest(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Shorthand for building an issue.
pub fn issue(parameter: &str, message: String, severity: Severity, fix: &str) -> ValidationIssue {
    ValidationIssue {
        parameter: parameter.to_string(),
        message,
        severity,
        suggested_fix: fix.to_string(),
    }
}
