//! The validation report.

use serde::Serialize;

use crate::grouping::{group_issues, IssueGroup};
use crate::issue::{CheckCategory, Severity, ValidationIssue};

/// Issue totals per check category.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CategoryCounts {
    pub structural: usize,
    pub heuristic: usize,
    pub advisory: usize,
}

/// The ordered, grouped collection of findings for one review run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Every finding, in production order (structural, then heuristic, then
    /// advisories).
    pub issues: Vec<ValidationIssue>,
    /// The grouped view the caller presents.
    pub groups: Vec<IssueGroup>,
    pub error_count: usize,
    pub warning_count: usize,
    pub counts_by_category: CategoryCounts,
}

impl ValidationReport {
    /// Build a report from the flat issue list, computing groups and counts.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let groups = group_issues(&issues);
        let error_count = issues.iter().filter(|i| i.severity == Severity::Error).count();
        let warning_count = issues.len() - error_count;
        let mut counts_by_category = CategoryCounts::default();
        for issue in &issues {
            match issue.category {
                CheckCategory::Structural => counts_by_category.structural += 1,
                CheckCategory::Heuristic => counts_by_category.heuristic += 1,
                CheckCategory::Advisory => counts_by_category.advisory += 1,
            }
        }
        Self { issues, groups, error_count, warning_count, counts_by_category }
    }

    /// True when nothing was found at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let issues = vec![
            ValidationIssue {
                pointer: "/a".to_owned(),
                message: "'x' is a required property".to_owned(),
                rule: "required".to_owned(),
                severity: Severity::Error,
                category: CheckCategory::Structural,
            },
            ValidationIssue {
                pointer: "/b".to_owned(),
                message: "field value is empty".to_owned(),
                rule: "empty-field".to_owned(),
                severity: Severity::Warning,
                category: CheckCategory::Heuristic,
            },
        ];
        let report = ValidationReport::from_issues(issues);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);
        assert_eq!(report.counts_by_category.structural, 1);
        assert_eq!(report.counts_by_category.heuristic, 1);
        assert_eq!(report.counts_by_category.advisory, 0);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_empty_report_is_clean() {
        assert!(ValidationReport::from_issues(vec![]).is_clean());
    }
}
