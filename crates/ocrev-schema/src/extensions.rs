//! Extension application and the resolved schema.
//!
//! Each declared extension is fetched and evaluated independently; a failure
//! marks that one extension failed and never aborts the rest. Successful
//! patches merge into the base schema in declaration order with
//! last-write-wins semantics at overlapping paths, mirroring declaration
//! precedence.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use ocrev_core::SchemaVersion;

use crate::fetch::{ExtensionFetcher, FetchFailure};

/// Outcome of evaluating one declared extension.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExtensionOutcome {
    /// The patch was fetched and merged into the resolved schema.
    Applied {
        /// The patch content as fetched.
        patch: Value,
    },
    /// The extension could not be fetched or parsed; it is excluded from the
    /// resolved schema.
    Failed {
        /// What went wrong.
        failure: FetchFailure,
    },
}

/// One declared extension and what became of it.
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionDescriptor {
    /// The URL as declared in the document.
    pub url: String,
    #[serde(flatten)]
    pub outcome: ExtensionOutcome,
}

impl ExtensionDescriptor {
    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, ExtensionOutcome::Applied { .. })
    }
}

/// The base schema for the effective version with all successfully applied
/// extension patches merged in.
///
/// Derived, never persisted: recomputed whenever the effective version or the
/// declared extension set changes.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSchema {
    /// The effective version whose base schema was extended.
    pub version: SchemaVersion,
    /// The merged schema the validator compiles.
    pub schema: Value,
    /// Every declared extension, in declaration order, each either applied
    /// or failed. The two outcomes partition the declared set.
    pub extensions: Vec<ExtensionDescriptor>,
}

impl ResolvedSchema {
    /// Descriptors whose patches were merged.
    pub fn applied(&self) -> impl Iterator<Item = &ExtensionDescriptor> {
        self.extensions.iter().filter(|d| d.is_applied())
    }

    /// Descriptors that failed to fetch or parse.
    pub fn failed(&self) -> impl Iterator<Item = &ExtensionDescriptor> {
        self.extensions.iter().filter(|d| !d.is_applied())
    }

    /// True when at least one extension patch was merged.
    pub fn is_extended(&self) -> bool {
        self.applied().next().is_some()
    }
}

/// Merges declared extension patches into a base schema.
pub struct ExtensionApplier<'f> {
    fetcher: &'f dyn ExtensionFetcher,
}

impl<'f> ExtensionApplier<'f> {
    pub fn new(fetcher: &'f dyn ExtensionFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch every declared extension and merge the successful patches into
    /// `base`, in declaration order.
    ///
    /// An empty `urls` list is a no-op success: the resolved schema equals
    /// the base. If every extension fails, likewise.
    ///
    /// Fetches run sequentially in declaration order. If they are ever made
    /// concurrent, the merge below must still walk `urls` in order so that
    /// last-write-wins stays tied to declaration precedence, not completion
    /// timing.
    pub fn apply(
        &self,
        version: SchemaVersion,
        base: &Value,
        urls: &[String],
    ) -> ResolvedSchema {
        let mut schema = base.clone();
        let mut extensions = Vec::with_capacity(urls.len());

        for url in urls {
            match self.fetcher.fetch(url) {
                Ok(patch) => {
                    debug!(%url, "merging extension patch");
                    json_merge_patch(&mut schema, &patch);
                    extensions.push(ExtensionDescriptor {
                        url: url.clone(),
                        outcome: ExtensionOutcome::Applied { patch },
                    });
                }
                Err(failure) => {
                    warn!(%url, %failure, "extension excluded from resolved schema");
                    extensions.push(ExtensionDescriptor {
                        url: url.clone(),
                        outcome: ExtensionOutcome::Failed { failure },
                    });
                }
            }
        }

        ResolvedSchema { version, schema, extensions }
    }
}

/// RFC 7386 merge patch.
///
/// Object members merge recursively, `null` removes the member, and any
/// non-object patch value replaces the target wholesale. Applying patches in
/// sequence therefore gives last-write-wins at overlapping paths.
pub fn json_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_obj) = patch else {
        *target = patch.clone();
        return;
    };
    if !matches!(target, Value::Object(_)) {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(target_obj) = target {
        for (key, patch_value) in patch_obj {
            if patch_value.is_null() {
                target_obj.remove(key);
            } else {
                json_merge_patch(
                    target_obj.entry(key.clone()).or_insert(Value::Null),
                    patch_value,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;
    use serde_json::json;

    fn base_schema() -> Value {
        json!({
            "properties": {
                "tender": {"properties": {"id": {"type": "string"}}}
            }
        })
    }

    #[test]
    fn test_merge_patch_recursive_merge() {
        let mut target = json!({"a": {"b": 1, "c": 2}});
        json_merge_patch(&mut target, &json!({"a": {"b": 9, "d": 3}}));
        assert_eq!(target, json!({"a": {"b": 9, "c": 2, "d": 3}}));
    }

    #[test]
    fn test_merge_patch_null_removes() {
        let mut target = json!({"a": 1, "b": 2});
        json_merge_patch(&mut target, &json!({"a": null}));
        assert_eq!(target, json!({"b": 2}));
    }

    #[test]
    fn test_merge_patch_non_object_replaces() {
        let mut target = json!({"a": {"b": 1}});
        json_merge_patch(&mut target, &json!({"a": [1, 2]}));
        assert_eq!(target, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_empty_declaration_list_is_noop() {
        let fetcher = StaticFetcher::new();
        let applier = ExtensionApplier::new(&fetcher);
        let resolved = applier.apply(SchemaVersion::new(1, 1), &base_schema(), &[]);
        assert_eq!(resolved.schema, base_schema());
        assert!(resolved.extensions.is_empty());
        assert!(!resolved.is_extended());
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let fetcher = StaticFetcher::new()
            .with_patch("https://a.example/ext.json", json!({"properties": {"x": {}}}))
            .with_failure(
                "https://b.example/ext.json",
                FetchFailure::Status { status: 404 },
            )
            .with_patch("https://c.example/ext.json", json!({"properties": {"y": {}}}));
        let applier = ExtensionApplier::new(&fetcher);
        let urls = vec![
            "https://a.example/ext.json".to_owned(),
            "https://b.example/ext.json".to_owned(),
            "https://c.example/ext.json".to_owned(),
        ];
        let resolved = applier.apply(SchemaVersion::new(1, 1), &base_schema(), &urls);

        assert_eq!(resolved.extensions.len(), 3);
        assert_eq!(resolved.applied().count(), 2);
        assert_eq!(resolved.failed().count(), 1);
        // Patches from the applied extensions only.
        assert!(resolved.schema["properties"]["x"].is_object());
        assert!(resolved.schema["properties"]["y"].is_object());
    }

    #[test]
    fn test_all_failed_yields_unmodified_base() {
        let fetcher = StaticFetcher::new().with_failure(
            "https://a.example/ext.json",
            FetchFailure::Transport { detail: "request timed out".to_owned() },
        );
        let applier = ExtensionApplier::new(&fetcher);
        let urls = vec!["https://a.example/ext.json".to_owned()];
        let resolved = applier.apply(SchemaVersion::new(1, 1), &base_schema(), &urls);
        assert_eq!(resolved.schema, base_schema());
        assert_eq!(resolved.failed().count(), 1);
    }

    #[test]
    fn test_later_declaration_wins_at_overlapping_path() {
        let fetcher = StaticFetcher::new()
            .with_patch(
                "https://first.example/ext.json",
                json!({"properties": {"tender": {"properties": {"id": {"type": "integer"}}}}}),
            )
            .with_patch(
                "https://second.example/ext.json",
                json!({"properties": {"tender": {"properties": {"id": {"type": "number"}}}}}),
            );
        let applier = ExtensionApplier::new(&fetcher);
        let urls = vec![
            "https://first.example/ext.json".to_owned(),
            "https://second.example/ext.json".to_owned(),
        ];
        let resolved = applier.apply(SchemaVersion::new(1, 1), &base_schema(), &urls);
        assert_eq!(
            resolved.schema["properties"]["tender"]["properties"]["id"]["type"],
            json!("number")
        );
    }
}
