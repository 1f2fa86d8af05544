//! Effective-version resolution.
//!
//! One version from the known set governs each review run. The resolver
//! checks, in order: the caller-supplied override (a protocol error if
//! unknown, since overrides are only ever offered from the closed set), then
//! the version field embedded in the document, then the per-format default.
//!
//! Malformed embedded versions do not abort the run. They surface as an
//! advisory and the run proceeds against the default version, so the
//! submitter still gets a full report. The common `major.minor.patch`
//! mistake gets its own advisory kind with an actionable message, checked
//! before the generic unrecognized case.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use ocrev_core::{SchemaVersion, VersionRegistry};

fn patch_form_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("static regex"))
}

/// Protocol-level failure: the caller-supplied override is not a known
/// version. This indicates a bug or tampering upstream, not bad user data.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("'{supplied}' is not a known schema version; the version argument must come from the supported set")]
    InvalidArgument {
        /// The override string that was supplied.
        supplied: String,
    },
}

/// Non-fatal finding about the document's embedded version field.
///
/// The run continues against the default version; the advisory is folded
/// into the validation report as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionAdvisory {
    /// The version string is not in the known set.
    Unrecognized {
        /// The literal value found in the data.
        raw: String,
    },
    /// The version string has a patch segment (`major.minor.patch`).
    PatchForm {
        /// The literal value found in the data.
        raw: String,
    },
    /// The version field is present but not a string.
    NonString {
        /// Rendering of the non-string value, e.g. `1000 (it must be a string)`.
        rendered: String,
    },
}

impl fmt::Display for VersionAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized { raw } => {
                write!(f, "'{raw}' is not a recognised schema version")
            }
            Self::PatchForm { raw } => write!(
                f,
                "'{raw}' contains a patch segment, which is not permitted; use the major.minor form"
            ),
            Self::NonString { rendered } => {
                write!(f, "the version field is unrecognised: {rendered}")
            }
        }
    }
}

/// Outcome of version resolution: the effective version, plus an advisory
/// when the embedded version field could not be honored.
#[derive(Debug, Clone, Serialize)]
pub struct VersionResolution {
    /// The version the rest of the pipeline runs against.
    pub version: SchemaVersion,
    /// Present when the embedded version field was malformed and the default
    /// version was used instead.
    pub advisory: Option<VersionAdvisory>,
}

/// Resolves the effective schema version for one review run.
#[derive(Debug, Clone, Copy)]
pub struct VersionResolver<'r> {
    registry: &'r VersionRegistry,
}

impl<'r> VersionResolver<'r> {
    pub fn new(registry: &'r VersionRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the effective version.
    ///
    /// `version_override` is a caller re-selection from the closed set;
    /// `declared` is the raw `version` field from the document (or tabular
    /// metadata); `default` is the per-format fallback from the registry.
    ///
    /// # Errors
    ///
    /// `VersionError::InvalidArgument` when the override does not match a
    /// known version exactly. Argument validation precedes any inspection of
    /// the document data.
    pub fn resolve(
        &self,
        version_override: Option<&str>,
        declared: Option<&Value>,
        default: SchemaVersion,
    ) -> Result<VersionResolution, VersionError> {
        if let Some(supplied) = version_override {
            let spec = self.registry.get_str(supplied).ok_or_else(|| {
                VersionError::InvalidArgument { supplied: supplied.to_owned() }
            })?;
            return Ok(VersionResolution { version: spec.version, advisory: None });
        }

        let Some(declared) = declared else {
            return Ok(VersionResolution { version: default, advisory: None });
        };

        let Some(raw) = declared.as_str() else {
            let rendered = format!("{} (it must be a string)", render_non_string(declared));
            return Ok(VersionResolution {
                version: default,
                advisory: Some(VersionAdvisory::NonString { rendered }),
            });
        };

        if let Some(version) = SchemaVersion::parse_exact(raw) {
            if self.registry.contains(version) {
                return Ok(VersionResolution { version, advisory: None });
            }
        }

        // Patch-form gets the more specific, actionable advisory.
        let advisory = if patch_form_re().is_match(raw) {
            VersionAdvisory::PatchForm { raw: raw.to_owned() }
        } else {
            VersionAdvisory::Unrecognized { raw: raw.to_owned() }
        };
        Ok(VersionResolution { version: default, advisory: Some(advisory) })
    }
}

/// Render a non-string JSON value the way it appeared in the data.
///
/// Numbers and booleans render bare (`1000`, `true`); arrays and objects
/// render as compact JSON.
fn render_non_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(
        version_override: Option<&str>,
        declared: Option<Value>,
    ) -> Result<VersionResolution, VersionError> {
        let registry = VersionRegistry::standard();
        let resolver = VersionResolver::new(&registry);
        let default = registry.default_json();
        resolver.resolve(version_override, declared.as_ref(), default)
    }

    #[test]
    fn test_known_versions_resolve_without_advisory() {
        for raw in ["1.0", "1.1"] {
            let resolution = resolve(None, Some(json!(raw))).unwrap();
            assert_eq!(resolution.version.to_string(), raw);
            assert!(resolution.advisory.is_none());
        }
    }

    #[test]
    fn test_absent_version_uses_default() {
        let resolution = resolve(None, None).unwrap();
        assert_eq!(resolution.version, SchemaVersion::new(1, 1));
        assert!(resolution.advisory.is_none());
    }

    #[test]
    fn test_override_takes_precedence_over_data() {
        let resolution = resolve(Some("1.0"), Some(json!("1.1"))).unwrap();
        assert_eq!(resolution.version, SchemaVersion::new(1, 0));
        assert!(resolution.advisory.is_none());
    }

    #[test]
    fn test_unknown_override_is_a_hard_error() {
        let err = resolve(Some("2.0"), Some(json!("1.1"))).unwrap_err();
        assert!(matches!(err, VersionError::InvalidArgument { ref supplied } if supplied == "2.0"));
    }

    #[test]
    fn test_patch_form_gets_specific_advisory() {
        let resolution = resolve(None, Some(json!("100.100.0"))).unwrap();
        assert_eq!(resolution.version, SchemaVersion::new(1, 1));
        assert_eq!(
            resolution.advisory,
            Some(VersionAdvisory::PatchForm { raw: "100.100.0".to_owned() })
        );
    }

    #[test]
    fn test_unrecognized_version_names_the_literal() {
        let resolution = resolve(None, Some(json!("123.123"))).unwrap();
        let advisory = resolution.advisory.unwrap();
        assert!(matches!(advisory, VersionAdvisory::Unrecognized { ref raw } if raw == "123.123"));
        assert!(advisory.to_string().contains("123.123"));
    }

    #[test]
    fn test_non_string_version_rendering() {
        let resolution = resolve(None, Some(json!(1000))).unwrap();
        assert_eq!(
            resolution.advisory,
            Some(VersionAdvisory::NonString {
                rendered: "1000 (it must be a string)".to_owned()
            })
        );
    }

    #[test]
    fn test_non_canonical_rendering_is_unrecognized() {
        // "01.1" is numerically 1.1 but is not a member of the known
        // string set; it falls back to the default with an advisory.
        let resolution = resolve(None, Some(json!("01.1"))).unwrap();
        assert_eq!(resolution.version, SchemaVersion::new(1, 1));
        assert!(matches!(
            resolution.advisory,
            Some(VersionAdvisory::Unrecognized { ref raw }) if raw == "01.1"
        ));
    }

    #[test]
    fn test_garbage_string_is_unrecognized() {
        let resolution = resolve(None, Some(json!("not-a-version"))).unwrap();
        assert!(matches!(
            resolution.advisory,
            Some(VersionAdvisory::Unrecognized { .. })
        ));
    }
}
