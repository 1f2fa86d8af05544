//! Document-level error taxonomy.
//!
//! These are the fatal failures that abort a review before version resolution
//! can even begin: the payload is not parseable as its declared format, or it
//! parses but does not have the top-level shape the schema family requires.
//! Non-fatal findings never appear here — they accumulate into the validation
//! report instead.

use thiserror::Error;

/// Fatal failure while reading or shaping a submitted document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The payload could not be parsed as the declared format.
    #[error("the submitted file is not well formed: {detail}")]
    MalformedInput {
        /// Parser diagnostic, suitable for showing to the submitter.
        detail: String,
    },

    /// The payload parsed, but the top level is not a JSON object.
    #[error("the submitted JSON must have an object at the top level")]
    NotAnObjectTopLevel,

    /// The top-level object is neither a release package nor a record package.
    ///
    /// Fatal for JSON input. Tabular input has no explicit wrapper by
    /// construction, so callers on the tabular path never raise this.
    #[error("the submitted data does not contain a releases or records section at the top level")]
    MissingPackageWrapper,
}
