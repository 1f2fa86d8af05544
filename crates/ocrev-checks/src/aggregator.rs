//! The validation aggregator.
//!
//! Runs, in order: structural validation against the resolved schema, then
//! the heuristic checks, then folds in the version-recognition advisory if
//! the resolver produced one. The concatenated findings become one
//! [`ValidationReport`].

use serde_json::Value;
use tracing::debug;

use ocrev_schema::{ResolvedSchema, VersionAdvisory};

use crate::heuristics::{standard_checks, HeuristicCheck};
use crate::issue::{CheckCategory, Severity, ValidationIssue};
use crate::report::ValidationReport;
use crate::structural::{StructuralError, StructuralValidator};

/// Aggregates structural and heuristic findings for one run.
pub struct ValidationAggregator {
    checks: Vec<Box<dyn HeuristicCheck>>,
}

impl Default for ValidationAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationAggregator {
    /// Aggregator with the standard heuristic checks.
    pub fn new() -> Self {
        Self { checks: standard_checks() }
    }

    /// Aggregator with a custom check list (tests, narrowed deployments).
    pub fn with_checks(checks: Vec<Box<dyn HeuristicCheck>>) -> Self {
        Self { checks }
    }

    /// Validate `package` against `schema` and build the report.
    ///
    /// The version advisory, when present, is folded in as a non-fatal
    /// warning rather than aborting validation — the run already proceeded
    /// against the default version's schema.
    ///
    /// # Errors
    ///
    /// `StructuralError::UnresolvableSchemaReference` when the resolved
    /// schema cannot be compiled. Fatal for the validation step only.
    pub fn validate(
        &self,
        package: &Value,
        schema: &ResolvedSchema,
        version_advisory: Option<&VersionAdvisory>,
    ) -> Result<ValidationReport, StructuralError> {
        let validator = StructuralValidator::compile(&schema.schema)?;
        let mut issues = validator.validate(package);
        debug!(count = issues.len(), "structural validation complete");

        for check in &self.checks {
            let findings = check.run(package, schema);
            if !findings.is_empty() {
                debug!(rule = check.rule(), count = findings.len(), "heuristic check fired");
                issues.extend(findings);
            }
        }

        if let Some(advisory) = version_advisory {
            issues.push(ValidationIssue {
                pointer: "/version".to_owned(),
                message: advisory.to_string(),
                rule: "version-recognition".to_owned(),
                severity: Severity::Warning,
                category: CheckCategory::Advisory,
            });
        }

        Ok(ValidationReport::from_issues(issues))
    }
}
