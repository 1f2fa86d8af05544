//! Local catalog of base schemas.
//!
//! Structural validation must not depend on the standard's website being
//! reachable, so the base schemas for every known version live on disk and
//! are loaded once at construction. Files are named
//! `<shape>-<version>.schema.json`, e.g. `release-package-1.1.schema.json`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use ocrev_core::{PackageShape, SchemaVersion};

/// Error loading or looking up a base schema.
#[derive(Error, Debug)]
pub enum SchemaCatalogError {
    /// A schema file could not be read or parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    Load {
        /// Schema filename or directory.
        schema_name: String,
        /// Why it could not be loaded.
        reason: String,
    },

    /// No schema file exists for the requested shape and version.
    #[error("no schema named '{schema_name}' in {dir}")]
    NotFound {
        /// The filename that was looked up.
        schema_name: String,
        /// The catalog directory.
        dir: String,
    },

    /// IO error while scanning the catalog directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// All base schemas for the known versions, loaded once from a directory.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    schema_dir: PathBuf,
    schemas: HashMap<String, Value>,
}

impl SchemaCatalog {
    /// Load every `*.schema.json` file in `schema_dir` and index it by
    /// filename.
    ///
    /// # Errors
    ///
    /// `SchemaCatalogError::Load` if the directory cannot be scanned or any
    /// schema file is not valid JSON.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaCatalogError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let mut schemas = HashMap::new();

        let entries = std::fs::read_dir(&schema_dir).map_err(|e| SchemaCatalogError::Load {
            schema_name: schema_dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(".schema.json") {
                    let content = std::fs::read_to_string(&path)?;
                    let value: Value =
                        serde_json::from_str(&content).map_err(|e| SchemaCatalogError::Load {
                            schema_name: name.to_owned(),
                            reason: format!("invalid JSON: {e}"),
                        })?;
                    schemas.insert(name.to_owned(), value);
                }
            }
        }

        Ok(Self { schema_dir, schemas })
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Look up a loaded schema by filename.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Names of all loaded schemas, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Filename convention for a package schema.
    pub fn package_schema_name(shape: PackageShape, version: SchemaVersion) -> String {
        let stem = match shape {
            PackageShape::ReleasePackage => "release-package",
            PackageShape::RecordPackage => "record-package",
        };
        format!("{stem}-{version}.schema.json")
    }

    /// The base package schema for a shape and version.
    ///
    /// # Errors
    ///
    /// `SchemaCatalogError::NotFound` when the catalog has no file for that
    /// shape/version pair.
    pub fn package_schema(
        &self,
        shape: PackageShape,
        version: SchemaVersion,
    ) -> Result<&Value, SchemaCatalogError> {
        let name = Self::package_schema_name(shape, version);
        self.schemas.get(&name).ok_or_else(|| SchemaCatalogError::NotFound {
            schema_name: name,
            dir: self.schema_dir.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_schema(dir: &Path, name: &str, value: &Value) {
        std::fs::write(dir.join(name), serde_json::to_vec_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn test_loads_only_schema_json_files() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "release-package-1.1.schema.json", &json!({"type": "object"}));
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let catalog = SchemaCatalog::new(dir.path()).unwrap();
        assert_eq!(catalog.schema_names(), vec!["release-package-1.1.schema.json"]);
    }

    #[test]
    fn test_package_schema_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "release-package-1.1.schema.json", &json!({"type": "object"}));
        write_schema(dir.path(), "record-package-1.1.schema.json", &json!({"type": "object"}));

        let catalog = SchemaCatalog::new(dir.path()).unwrap();
        assert!(catalog
            .package_schema(PackageShape::ReleasePackage, SchemaVersion::new(1, 1))
            .is_ok());
        let err = catalog
            .package_schema(PackageShape::ReleasePackage, SchemaVersion::new(1, 0))
            .unwrap_err();
        assert!(matches!(err, SchemaCatalogError::NotFound { .. }));
    }

    #[test]
    fn test_invalid_json_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.schema.json"), b"{not json").unwrap();
        let err = SchemaCatalog::new(dir.path()).unwrap_err();
        assert!(matches!(err, SchemaCatalogError::Load { .. }));
    }
}
