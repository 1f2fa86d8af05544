//! The validation-issue model.

use std::fmt;

use serde::Serialize;

/// How serious a finding is. Errors sort before warnings in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Which stage of the aggregator produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckCategory {
    /// Schema non-conformance.
    Structural,
    /// A rule not expressible as schema conformance.
    Heuristic,
    /// A non-fatal note from an earlier pipeline stage (e.g. an
    /// unrecognized version field).
    Advisory,
}

/// One located finding.
///
/// Never persisted on its own — only as part of a report.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    /// JSON pointer locating the finding in the submitted document.
    pub pointer: String,
    /// Human-readable message.
    pub message: String,
    /// Stable identifier of the rule that fired (e.g. `required`,
    /// `empty-field`).
    pub rule: String,
    pub severity: Severity,
    pub category: CheckCategory,
}
