//! Structural validation against the resolved schema.
//!
//! Thin wrapper over the `jsonschema` crate: compiles the resolved schema
//! once (Draft 4, as this schema family declares) and maps every validation
//! error to a located [`ValidationIssue`]. A local retriever refuses all
//! external `$ref` retrieval, so compiling and validating never touch the
//! network; extension patches must carry their definitions inline.

use jsonschema::{Retrieve, Uri};
use serde_json::Value;
use thiserror::Error;

use crate::issue::{CheckCategory, Severity, ValidationIssue};

/// Refuses every external reference lookup.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema reference '{}' is not retrievable", uri.as_str()).into())
    }
}

/// Fatal failure of the validation step.
///
/// Conversion may still have succeeded; only validation aborts.
#[derive(Error, Debug)]
pub enum StructuralError {
    /// The schema could not be compiled, most commonly because a `$ref`
    /// cannot be dereferenced (an extension patch pointing at an
    /// unreachable schema).
    #[error("the schema could not be compiled for validation: {detail}")]
    UnresolvableSchemaReference {
        /// Compiler diagnostic.
        detail: String,
    },
}

/// A compiled validator for one resolved schema.
#[derive(Debug)]
pub struct StructuralValidator {
    validator: jsonschema::Validator,
}

impl StructuralValidator {
    /// Compile `schema`.
    ///
    /// # Errors
    ///
    /// `StructuralError::UnresolvableSchemaReference` when compilation fails.
    pub fn compile(schema: &Value) -> Result<Self, StructuralError> {
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft4)
            .with_retriever(OfflineRetriever)
            .build(schema)
            .map_err(|e| StructuralError::UnresolvableSchemaReference { detail: e.to_string() })?;
        Ok(Self { validator })
    }

    /// Validate `package`, returning one issue per schema violation:
    /// missing required properties, type mismatches, pattern mismatches,
    /// closed-codelist (enum) violations, each at its JSON pointer.
    pub fn validate(&self, package: &Value) -> Vec<ValidationIssue> {
        self.validator
            .iter_errors(package)
            .map(|e| ValidationIssue {
                pointer: e.instance_path.to_string(),
                message: e.to_string(),
                rule: rule_from_schema_path(&e.schema_path.to_string()),
                severity: Severity::Error,
                category: CheckCategory::Structural,
            })
            .collect()
    }
}

/// The rule identifier is the last keyword segment of the schema path,
/// e.g. `/properties/releases/items/required` → `required`.
fn rule_from_schema_path(schema_path: &str) -> String {
    schema_path
        .rsplit('/')
        .find(|seg| !seg.is_empty() && !seg.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or("schema")
        .to_owned()
}
