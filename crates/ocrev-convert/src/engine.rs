//! The conversion-engine seam.
//!
//! The review kit does not implement flattening or unflattening itself; it
//! orchestrates an external engine behind this trait. Engines fail with a
//! typed error — the cache never stores a partial artifact.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ocrev_core::{SubmittedDocument, TabularMetadata};

/// The representation a conversion produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Unflattening: tabular input rendered as a JSON package.
    Json,
    /// Flattening: a JSON package rendered as a spreadsheet.
    Tabular,
}

impl TargetFormat {
    /// Fixed artifact filename inside the per-document directory.
    pub fn artifact_name(&self) -> &'static str {
        match self {
            Self::Json => "unflattened.json",
            Self::Tabular => "flattened.xlsx",
        }
    }

    /// Fixed metadata filename alongside the artifact.
    pub fn meta_name(&self) -> &'static str {
        match self {
            Self::Json => "unflattened.meta.json",
            Self::Tabular => "flattened.meta.json",
        }
    }
}

/// Why the target format could not be produced.
///
/// Non-fatal at the pipeline level: the document may still be reviewable
/// without a converted counterpart, but the failure is reported to the
/// caller.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversionError {
    /// The package has no recognizable top-level collection to flatten.
    #[error("the package contains no top-level releases or records collection to convert")]
    NoTopLevelCollection,

    /// The tabular structure could not be assembled into a package.
    #[error("the tabular structure could not be converted: {detail}")]
    UnconvertibleShape {
        /// Engine diagnostic.
        detail: String,
    },

    /// Any other engine failure.
    #[error("conversion engine failure: {detail}")]
    Engine {
        /// Engine diagnostic.
        detail: String,
    },
}

/// Converts a document to the complementary representation.
///
/// Treated as a pure function of the document bytes and the schema URL; the
/// cache layer owns all persistence.
pub trait ConversionEngine {
    /// Produce `target`-format bytes for `document`, shaping the output
    /// according to the (possibly extended) schema at `schema_url`.
    fn convert(
        &self,
        document: &SubmittedDocument,
        target: TargetFormat,
        schema_url: &str,
    ) -> Result<Vec<u8>, ConversionError>;
}

/// Reads the metadata tab of a spreadsheet submission.
///
/// Tabular input has no package wrapper, so version resolution and extension
/// discovery need these fields before any conversion runs. Implemented by
/// the same component that implements [`ConversionEngine`].
pub trait MetadataExtractor {
    /// Extract the metadata fields from a spreadsheet document.
    fn extract_metadata(
        &self,
        document: &SubmittedDocument,
    ) -> Result<TabularMetadata, ConversionError>;
}
