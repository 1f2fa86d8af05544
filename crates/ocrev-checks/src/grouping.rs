//! Deterministic grouping of findings.
//!
//! N occurrences of "'id' is missing but required" collapse into one group
//! keyed by the firing rule and a normalized message template, with a count
//! and a short representative location list. Ordering is a design contract: severity
//! first, then descending count, ties broken by first-seen order — identical
//! input always yields identical output.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::issue::{Severity, ValidationIssue};

/// How many representative locations a group retains.
const LOCATION_SAMPLE: usize = 3;

fn quoted_literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""[^"]*"|'[^']*'"#).expect("static regex"))
}

fn integer_literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+\b").expect("static regex"))
}

/// Strip instance-specific values from a message, leaving the template.
///
/// Quoted literals (single or double) and bare integers (array indices,
/// offending numbers) are replaced by placeholders.
pub fn normalize_message(message: &str) -> String {
    let stripped = quoted_literal_re().replace_all(message, "{value}");
    integer_literal_re().replace_all(&stripped, "{n}").into_owned()
}

/// A set of findings sharing one message template.
#[derive(Debug, Clone, Serialize)]
pub struct IssueGroup {
    /// The normalized message template.
    pub template: String,
    /// Message of the first occurrence, kept verbatim as the representative.
    pub representative_message: String,
    /// Rule identifier shared by every member of the group.
    pub rule: String,
    pub severity: Severity,
    /// Total occurrences.
    pub count: usize,
    /// First few locations (JSON pointers).
    pub locations: Vec<String>,
    /// How many further locations were not retained.
    pub additional_locations: usize,
}

/// Group a flat issue list.
///
/// Issues with the same severity, rule, and normalized template merge;
/// groups are ordered errors-first, then by descending count, then by first
/// appearance in the input. Keying on the rule as well keeps two rules with
/// coincidentally identical templates in separate groups.
pub fn group_issues(issues: &[ValidationIssue]) -> Vec<IssueGroup> {
    let mut groups: Vec<IssueGroup> = Vec::new();
    let mut index: HashMap<(Severity, String, String), usize> = HashMap::new();
    let mut overflow: Vec<usize> = Vec::new();

    for issue in issues {
        let template = normalize_message(&issue.message);
        let key = (issue.severity, issue.rule.clone(), template.clone());
        match index.get(&key) {
            Some(&i) => {
                groups[i].count += 1;
                if groups[i].locations.len() < LOCATION_SAMPLE {
                    groups[i].locations.push(issue.pointer.clone());
                } else {
                    overflow[i] += 1;
                }
            }
            None => {
                index.insert(key, groups.len());
                overflow.push(0);
                groups.push(IssueGroup {
                    template,
                    representative_message: issue.message.clone(),
                    rule: issue.rule.clone(),
                    severity: issue.severity,
                    count: 1,
                    locations: vec![issue.pointer.clone()],
                    additional_locations: 0,
                });
            }
        }
    }

    for (group, extra) in groups.iter_mut().zip(overflow) {
        group.additional_locations = extra;
    }

    // Stable sort keeps first-seen order for ties.
    let mut ordered: Vec<IssueGroup> = groups;
    ordered.sort_by(|a, b| {
        a.severity.cmp(&b.severity).then_with(|| b.count.cmp(&a.count))
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::CheckCategory;

    fn issue(pointer: &str, message: &str, severity: Severity) -> ValidationIssue {
        ruled_issue(pointer, message, "test", severity)
    }

    fn ruled_issue(
        pointer: &str,
        message: &str,
        rule: &str,
        severity: Severity,
    ) -> ValidationIssue {
        ValidationIssue {
            pointer: pointer.to_owned(),
            message: message.to_owned(),
            rule: rule.to_owned(),
            severity,
            category: CheckCategory::Structural,
        }
    }

    #[test]
    fn test_normalize_strips_quoted_literals_and_integers() {
        assert_eq!(
            normalize_message(r#""abc" is not one of 3 permitted values"#),
            "{value} is not one of {n} permitted values"
        );
        assert_eq!(
            normalize_message("'id' is a required property"),
            "{value} is a required property"
        );
    }

    #[test]
    fn test_same_template_collapses() {
        let issues = vec![
            issue("/releases/0/tender", "'id' is a required property", Severity::Error),
            issue("/releases/1/tender", "'id' is a required property", Severity::Error),
            issue("/releases/2/tender", "'title' is a required property", Severity::Error),
        ];
        let groups = group_issues(&issues);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].locations.len(), 3);
    }

    #[test]
    fn test_identical_templates_from_different_rules_stay_apart() {
        let issues = vec![
            ruled_issue("/a", "'x' is not valid", "pattern", Severity::Error),
            ruled_issue("/b", "'y' is not valid", "enum", Severity::Error),
        ];
        let groups = group_issues(&issues);
        assert_eq!(groups.len(), 2);
        let rules: Vec<&str> = groups.iter().map(|g| g.rule.as_str()).collect();
        assert!(rules.contains(&"pattern"));
        assert!(rules.contains(&"enum"));
    }

    #[test]
    fn test_errors_sort_before_warnings() {
        let issues = vec![
            issue("/a", "field value is empty", Severity::Warning),
            issue("/b", "field value is empty", Severity::Warning),
            issue("/c", "'x' is a required property", Severity::Error),
        ];
        let groups = group_issues(&issues);
        assert_eq!(groups[0].severity, Severity::Error);
        assert_eq!(groups[1].severity, Severity::Warning);
        assert_eq!(groups[1].count, 2);
    }

    #[test]
    fn test_descending_count_then_first_seen() {
        let issues = vec![
            issue("/a", "alpha problem", Severity::Error),
            issue("/b", "beta problem", Severity::Error),
            issue("/c", "beta problem", Severity::Error),
            issue("/d", "gamma problem", Severity::Error),
        ];
        let groups = group_issues(&issues);
        assert_eq!(groups[0].template, "beta problem");
        // Tie between alpha and gamma resolves by first appearance.
        assert_eq!(groups[1].template, "alpha problem");
        assert_eq!(groups[2].template, "gamma problem");
    }

    #[test]
    fn test_location_sample_caps_with_overflow_count() {
        let issues: Vec<ValidationIssue> = (0..5)
            .map(|i| {
                issue(&format!("/releases/{i}"), "'id' is a required property", Severity::Error)
            })
            .collect();
        let groups = group_issues(&issues);
        assert_eq!(groups[0].count, 5);
        assert_eq!(groups[0].locations.len(), LOCATION_SAMPLE);
        assert_eq!(groups[0].additional_locations, 2);
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let issues = vec![
            issue("/a", "alpha 'x'", Severity::Warning),
            issue("/b", "beta 2", Severity::Error),
            issue("/c", "alpha 'y'", Severity::Warning),
        ];
        let first = serde_json::to_string(&group_issues(&issues)).unwrap();
        let second = serde_json::to_string(&group_issues(&issues)).unwrap();
        assert_eq!(first, second);
    }
}
