//! # ocrev-checks — Validation and Reporting
//!
//! Runs a submitted package through structural validation against the
//! resolved (possibly extended) schema, then through heuristic checks that
//! schema conformance cannot express, and folds everything — including the
//! version-recognition advisory — into one grouped, deterministic report.
//!
//! ## Report Contract
//!
//! Grouping and ordering are deterministic given the same issue list:
//! severity first (errors before warnings), then descending occurrence
//! count, ties broken by first-seen order. A heuristic check with zero
//! findings contributes nothing, not an empty section.

pub mod aggregator;
pub mod grouping;
pub mod heuristics;
pub mod issue;
pub mod report;
pub mod structural;

pub use aggregator::ValidationAggregator;
pub use grouping::{group_issues, IssueGroup};
pub use heuristics::{
    standard_checks, DeprecatedFieldCheck, EmptyFieldCheck, HeuristicCheck, MissingIdCheck,
};
pub use issue::{CheckCategory, Severity, ValidationIssue};
pub use report::ValidationReport;
pub use structural::{StructuralError, StructuralValidator};
