//! Heuristic checks.
//!
//! Rules that schema conformance cannot express. Each check walks the
//! package independently of structural validation and returns zero or more
//! located findings; a check with zero findings contributes nothing to the
//! report.
//!
//! Messages are kept stable per rule (instance specifics live in the
//! pointer or in quoted literals) so the grouper collapses N occurrences of
//! the same rule into one group with a location list.

use serde_json::Value;

use ocrev_core::JsonPointer;
use ocrev_schema::ResolvedSchema;

use crate::issue::{CheckCategory, Severity, ValidationIssue};

/// One heuristic rule.
pub trait HeuristicCheck {
    /// Stable rule identifier.
    fn rule(&self) -> &'static str;

    /// Human-readable description of the rule, surfaced with its findings.
    fn description(&self) -> &'static str;

    /// Run the rule over the whole package.
    fn run(&self, package: &Value, schema: &ResolvedSchema) -> Vec<ValidationIssue>;
}

/// The checks the aggregator runs, in order.
pub fn standard_checks() -> Vec<Box<dyn HeuristicCheck>> {
    vec![
        Box::new(EmptyFieldCheck),
        Box::new(MissingIdCheck),
        Box::new(DeprecatedFieldCheck),
    ]
}

fn warning(rule: &'static str, pointer: JsonPointer, message: String) -> ValidationIssue {
    ValidationIssue {
        pointer: pointer.into_string(),
        message,
        rule: rule.to_owned(),
        severity: Severity::Warning,
        category: CheckCategory::Heuristic,
    }
}

/// Flags string values that are empty or contain only whitespace.
pub struct EmptyFieldCheck;

impl HeuristicCheck for EmptyFieldCheck {
    fn rule(&self) -> &'static str {
        "empty-field"
    }

    fn description(&self) -> &'static str {
        "fields should not be empty or contain only whitespace"
    }

    fn run(&self, package: &Value, _schema: &ResolvedSchema) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        walk(package, JsonPointer::root(), &mut |value, pointer| {
            if let Some(s) = value.as_str() {
                if s.trim().is_empty() {
                    issues.push(warning(
                        self.rule(),
                        pointer.clone(),
                        "field value is empty or contains only whitespace".to_owned(),
                    ));
                }
            }
        });
        issues
    }
}

/// Array fields that conventionally identify their elements with `id`.
const ID_BEARING_ARRAYS: &[&str] = &[
    "releases",
    "awards",
    "contracts",
    "items",
    "parties",
    "documents",
    "milestones",
    "transactions",
    "amendments",
];

/// Flags elements of conventional arrays that lack an `id` member.
pub struct MissingIdCheck;

impl HeuristicCheck for MissingIdCheck {
    fn rule(&self) -> &'static str {
        "missing-id"
    }

    fn description(&self) -> &'static str {
        "elements of identifying arrays should carry an 'id' field"
    }

    fn run(&self, package: &Value, _schema: &ResolvedSchema) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        walk_members(package, JsonPointer::root(), &mut |key, value, pointer| {
            if !ID_BEARING_ARRAYS.contains(&key) {
                return;
            }
            let Some(elements) = value.as_array() else { return };
            for (i, element) in elements.iter().enumerate() {
                if let Some(obj) = element.as_object() {
                    if !obj.contains_key("id") {
                        issues.push(warning(
                            self.rule(),
                            pointer.index(i),
                            "array element has no identifying 'id' field".to_owned(),
                        ));
                    }
                }
            }
        });
        issues
    }
}

/// Flags usage of fields the resolved schema marks as deprecated.
///
/// The schema family annotates a property with a `deprecated` object
/// (`deprecatedVersion`, `description`) when a field is scheduled for
/// removal. The check walks the document and the schema in lockstep through
/// `properties` and `items`.
pub struct DeprecatedFieldCheck;

impl HeuristicCheck for DeprecatedFieldCheck {
    fn rule(&self) -> &'static str {
        "deprecated-field"
    }

    fn description(&self) -> &'static str {
        "fields deprecated in the effective schema version should not be used"
    }

    fn run(&self, package: &Value, schema: &ResolvedSchema) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        descend(package, &schema.schema, JsonPointer::root(), &mut issues);
        issues
    }
}

fn descend(
    value: &Value,
    schema: &Value,
    pointer: JsonPointer,
    issues: &mut Vec<ValidationIssue>,
) {
    match value {
        Value::Object(obj) => {
            let properties = schema.get("properties");
            for (key, member) in obj {
                let member_schema = properties.and_then(|p| p.get(key));
                if let Some(member_schema) = member_schema {
                    if let Some(deprecation) = member_schema.get("deprecated") {
                        let since = deprecation
                            .get("deprecatedVersion")
                            .and_then(Value::as_str)
                            .unwrap_or("an earlier version");
                        issues.push(warning(
                            "deprecated-field",
                            pointer.child(key),
                            format!("'{key}' was deprecated in version {since}"),
                        ));
                    }
                    descend(member, member_schema, pointer.child(key), issues);
                }
            }
        }
        Value::Array(elements) => {
            if let Some(item_schema) = schema.get("items") {
                for (i, element) in elements.iter().enumerate() {
                    descend(element, item_schema, pointer.index(i), issues);
                }
            }
        }
        _ => {}
    }
}

/// Depth-first walk over every value in the tree.
fn walk(value: &Value, pointer: JsonPointer, visit: &mut impl FnMut(&Value, &JsonPointer)) {
    visit(value, &pointer);
    match value {
        Value::Object(obj) => {
            for (key, member) in obj {
                walk(member, pointer.child(key), visit);
            }
        }
        Value::Array(elements) => {
            for (i, element) in elements.iter().enumerate() {
                walk(element, pointer.index(i), visit);
            }
        }
        _ => {}
    }
}

/// Depth-first walk over every object member, visited as (key, value,
/// pointer-to-value).
fn walk_members(
    value: &Value,
    pointer: JsonPointer,
    visit: &mut impl FnMut(&str, &Value, &JsonPointer),
) {
    match value {
        Value::Object(obj) => {
            for (key, member) in obj {
                let child = pointer.child(key);
                visit(key, member, &child);
                walk_members(member, child, visit);
            }
        }
        Value::Array(elements) => {
            for (i, element) in elements.iter().enumerate() {
                walk_members(element, pointer.index(i), visit);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrev_core::SchemaVersion;
    use serde_json::json;

    fn resolved(schema: Value) -> ResolvedSchema {
        ResolvedSchema { version: SchemaVersion::new(1, 1), schema, extensions: vec![] }
    }

    #[test]
    fn test_empty_field_check_locates_both_instances() {
        let package = json!({
            "releases": [{
                "ocid": "ocds-1",
                "tender": {"id": ""},
                "buyer": {"name": "   "}
            }]
        });
        let issues = EmptyFieldCheck.run(&package, &resolved(json!({})));
        let pointers: Vec<&str> = issues.iter().map(|i| i.pointer.as_str()).collect();
        assert_eq!(pointers, vec!["/releases/0/buyer/name", "/releases/0/tender/id"]);
    }

    #[test]
    fn test_empty_field_check_ignores_populated_strings() {
        let package = json!({"releases": [{"ocid": "ocds-1"}]});
        assert!(EmptyFieldCheck.run(&package, &resolved(json!({}))).is_empty());
    }

    #[test]
    fn test_missing_id_check_only_conventional_arrays() {
        let package = json!({
            "releases": [
                {"id": "1"},
                {"ocid": "ocds-2"}
            ],
            "somethingElse": [{"no": "id"}]
        });
        let issues = MissingIdCheck.run(&package, &resolved(json!({})));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].pointer, "/releases/1");
    }

    #[test]
    fn test_missing_id_check_nested_arrays() {
        let package = json!({
            "releases": [{
                "id": "1",
                "awards": [{"title": "no id here"}]
            }]
        });
        let issues = MissingIdCheck.run(&package, &resolved(json!({})));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].pointer, "/releases/0/awards/0");
    }

    #[test]
    fn test_deprecated_field_check_follows_schema() {
        let schema = json!({
            "properties": {
                "releases": {
                    "items": {
                        "properties": {
                            "planning": {
                                "properties": {},
                                "deprecated": {
                                    "deprecatedVersion": "1.1",
                                    "description": "moved elsewhere"
                                }
                            },
                            "ocid": {"type": "string"}
                        }
                    }
                }
            }
        });
        let package = json!({
            "releases": [{"ocid": "ocds-1", "planning": {}}]
        });
        let issues = DeprecatedFieldCheck.run(&package, &resolved(schema));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].pointer, "/releases/0/planning");
        assert!(issues[0].message.contains("1.1"));
    }

    #[test]
    fn test_deprecated_field_check_silent_without_annotations() {
        let schema = json!({"properties": {"releases": {"items": {"properties": {}}}}});
        let package = json!({"releases": [{"ocid": "x"}]});
        assert!(DeprecatedFieldCheck.run(&package, &resolved(schema)).is_empty());
    }
}
