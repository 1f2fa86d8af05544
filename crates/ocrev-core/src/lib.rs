//! # ocrev-core — Foundational Types for the Review Kit
//!
//! This crate is the bedrock of the Open Contracting Review Kit. It defines
//! the types every other crate in the workspace shares: the submitted-document
//! model, the closed registry of known schema versions, the document-level
//! error taxonomy, and JSON-pointer helpers used to locate findings.
//!
//! ## Key Design Principles
//!
//! 1. **Closed variants over runtime inspection.** Input format is a
//!    two-variant enum (`Json` | `Spreadsheet`), not a string sniffed at each
//!    call site. Package shape is likewise a closed enum.
//!
//! 2. **Immutable version registry.** The set of known schema versions is
//!    built once at process start and passed by reference into each pipeline
//!    invocation. No mutable global state.
//!
//! 3. **Typed failures.** Parse and shape problems are an explicit error-kind
//!    enumeration callers pattern-match on, never a stringly-typed bail-out.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ocrev-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod pointer;
pub mod version;

pub use document::{
    declared_extensions, package_shape, DocumentId, PackageShape, SourceFormat, SpreadsheetKind,
    SubmittedDocument, TabularMetadata,
};
pub use error::DocumentError;
pub use pointer::JsonPointer;
pub use version::{SchemaVersion, VersionRegistry, VersionSpec};
