//! The submitted-document model.
//!
//! A [`SubmittedDocument`] is the immutable input to one review run: raw
//! bytes, a detected or declared [`SourceFormat`], and a stable identity that
//! keys every artifact derived from it. The core reads it and never mutates it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DocumentError;

/// Stable identity for a submitted document.
///
/// Keys the per-document artifact directory, so repeated runs on the same
/// submission locate prior conversion artifacts deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh random identity.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (e.g., one recovered from a store directory name).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The spreadsheet dialects the conversion engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetKind {
    Xlsx,
    Csv,
    Ods,
}

/// Input format of a submitted document.
///
/// A closed two-variant enum: each variant carries its own metadata-extraction
/// path through the pipeline, so there is no runtime type sniffing past this
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Spreadsheet(SpreadsheetKind),
}

impl SourceFormat {
    /// Detect the format from a file name's extension.
    ///
    /// Returns `None` for extensions the review kit does not accept.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit('.').next()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "xlsx" => Some(Self::Spreadsheet(SpreadsheetKind::Xlsx)),
            "csv" => Some(Self::Spreadsheet(SpreadsheetKind::Csv)),
            "ods" => Some(Self::Spreadsheet(SpreadsheetKind::Ods)),
            _ => None,
        }
    }

}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Spreadsheet(SpreadsheetKind::Xlsx) => write!(f, "xlsx"),
            Self::Spreadsheet(SpreadsheetKind::Csv) => write!(f, "csv"),
            Self::Spreadsheet(SpreadsheetKind::Ods) => write!(f, "ods"),
        }
    }
}

/// The two top-level document shapes this schema family supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageShape {
    /// A package of releases.
    ReleasePackage,
    /// A package of records, each aggregating the release history of one
    /// contracting process.
    RecordPackage,
}

/// One submitted document: immutable bytes plus identity and format.
#[derive(Debug, Clone)]
pub struct SubmittedDocument {
    id: DocumentId,
    format: SourceFormat,
    bytes: Vec<u8>,
}

impl SubmittedDocument {
    pub fn new(id: DocumentId, format: SourceFormat, bytes: Vec<u8>) -> Self {
        Self { id, format, bytes }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Parse the raw bytes as a top-level JSON object.
    ///
    /// # Errors
    ///
    /// `MalformedInput` if the bytes are not valid JSON; `NotAnObjectTopLevel`
    /// if they parse to an array, string, number, boolean, or null.
    pub fn parse_json(&self) -> Result<Value, DocumentError> {
        let value: Value = serde_json::from_slice(&self.bytes)
            .map_err(|e| DocumentError::MalformedInput { detail: e.to_string() })?;
        if !value.is_object() {
            return Err(DocumentError::NotAnObjectTopLevel);
        }
        Ok(value)
    }
}

/// Classify a parsed package as a release or record package.
///
/// # Errors
///
/// `MissingPackageWrapper` when the object has neither a `releases` nor a
/// `records` member. Callers on the tabular path must not treat this as fatal:
/// flattened data has no explicit wrapper by construction.
pub fn package_shape(package: &Value) -> Result<PackageShape, DocumentError> {
    let obj = package.as_object().ok_or(DocumentError::NotAnObjectTopLevel)?;
    if obj.contains_key("records") {
        Ok(PackageShape::RecordPackage)
    } else if obj.contains_key("releases") {
        Ok(PackageShape::ReleasePackage)
    } else {
        Err(DocumentError::MissingPackageWrapper)
    }
}

/// Metadata fields extracted from a spreadsheet's metadata tab.
///
/// Tabular input never carries a package wrapper, so version resolution and
/// extension discovery read these extracted fields instead of the full parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabularMetadata {
    /// The raw `version` cell, if present. Kept as a JSON value so the
    /// resolver can report non-string values faithfully.
    pub version: Option<Value>,
    /// Extension URLs declared in the metadata tab, in declaration order.
    pub extensions: Vec<String>,
}

impl TabularMetadata {
    /// Extract metadata fields from a parsed metadata-tab object.
    pub fn from_meta_object(meta: &Value) -> Self {
        let version = meta.get("version").cloned();
        let extensions = meta
            .get("extensions")
            .and_then(Value::as_array)
            .map(|urls| {
                urls.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        Self { version, extensions }
    }
}

/// Extension URLs declared in a JSON package, in declaration order.
pub fn declared_extensions(package: &Value) -> Vec<String> {
    package
        .get("extensions")
        .and_then(Value::as_array)
        .map(|urls| {
            urls.iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(bytes: &[u8]) -> SubmittedDocument {
        SubmittedDocument::new(DocumentId::random(), SourceFormat::Json, bytes.to_vec())
    }

    #[test]
    fn test_format_detection_from_file_name() {
        assert_eq!(SourceFormat::from_file_name("data.json"), Some(SourceFormat::Json));
        assert_eq!(
            SourceFormat::from_file_name("DATA.XLSX"),
            Some(SourceFormat::Spreadsheet(SpreadsheetKind::Xlsx))
        );
        assert_eq!(
            SourceFormat::from_file_name("rows.csv"),
            Some(SourceFormat::Spreadsheet(SpreadsheetKind::Csv))
        );
        assert_eq!(SourceFormat::from_file_name("notes.txt"), None);
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = doc(b"{not json").parse_json().unwrap_err();
        assert!(matches!(err, DocumentError::MalformedInput { .. }));
    }

    #[test]
    fn test_parse_non_object_top_level() {
        let err = doc(b"[1, 2, 3]").parse_json().unwrap_err();
        assert!(matches!(err, DocumentError::NotAnObjectTopLevel));
    }

    #[test]
    fn test_package_shape_release_and_record() {
        assert_eq!(
            package_shape(&json!({"releases": []})).unwrap(),
            PackageShape::ReleasePackage
        );
        assert_eq!(
            package_shape(&json!({"records": []})).unwrap(),
            PackageShape::RecordPackage
        );
    }

    #[test]
    fn test_package_shape_missing_wrapper() {
        let err = package_shape(&json!({"publisher": {"name": "x"}})).unwrap_err();
        assert!(matches!(err, DocumentError::MissingPackageWrapper));
    }

    #[test]
    fn test_tabular_metadata_extraction() {
        let meta = json!({
            "version": "1.1",
            "extensions": ["https://example.com/a.json", "https://example.com/b.json"],
            "publishedDate": "2020-01-01T00:00:00Z"
        });
        let extracted = TabularMetadata::from_meta_object(&meta);
        assert_eq!(extracted.version, Some(json!("1.1")));
        assert_eq!(extracted.extensions.len(), 2);
    }

    #[test]
    fn test_declared_extensions_order_preserved() {
        let package = json!({
            "releases": [],
            "extensions": ["https://z.example/ext.json", "https://a.example/ext.json"]
        });
        let urls = declared_extensions(&package);
        assert_eq!(urls[0], "https://z.example/ext.json");
        assert_eq!(urls[1], "https://a.example/ext.json");
    }
}
