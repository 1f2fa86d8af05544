//! The pipeline's fatal-error taxonomy.
//!
//! One enum, one variant per failing stage, so callers pattern-match on kind
//! instead of catching by type. Everything here aborts the run; non-fatal
//! findings travel in the outcome instead.

use thiserror::Error;

use ocrev_checks::StructuralError;
use ocrev_convert::{CacheError, ConversionError};
use ocrev_core::DocumentError;
use ocrev_schema::{SchemaCatalogError, VersionError};

/// Fatal failure of a review run.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// The document could not be parsed or lacks the required wrapper.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The caller-supplied version override is not a known version.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// The base schema for the effective version is not in the catalog.
    #[error(transparent)]
    Catalog(#[from] SchemaCatalogError),

    /// The resolved schema could not be compiled for validation.
    #[error(transparent)]
    Validation(#[from] StructuralError),

    /// Artifact store or cache failure.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Tabular input could not be read at all. Unlike the JSON path, where a
    /// failed conversion still leaves a reviewable document, tabular input
    /// must convert before anything can be validated.
    #[error("the spreadsheet could not be processed: {0}")]
    Tabular(#[from] ConversionError),

    /// The conversion engine produced bytes that are not a JSON package.
    #[error("the converted package is not readable JSON: {detail}")]
    ConvertedUnreadable {
        /// Parser diagnostic.
        detail: String,
    },

    /// The validation report could not be encoded for persistence.
    #[error("failed to encode the validation report: {detail}")]
    ReportEncoding {
        /// Serde diagnostic.
        detail: String,
    },
}
