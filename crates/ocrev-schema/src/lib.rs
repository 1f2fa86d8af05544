//! # ocrev-schema — Version Resolution and Extension Merging
//!
//! Determines which schema version governs a submitted document, fetches the
//! schema extensions it declares, and merges their patches into the base
//! schema in declaration order.
//!
//! ## Determinism Invariant
//!
//! Overlapping extension patches resolve last-write-wins in *declaration*
//! order. Fetches happen sequentially today; if they are ever parallelized,
//! the merge loop must still consume the ordered declaration list, never
//! completion order.
//!
//! ## Failure Partition
//!
//! Every declared extension ends up in exactly one of the applied or failed
//! sets. A fetch or parse failure excludes that one extension and never
//! aborts the others; if every extension fails, the resolved schema equals
//! the unmodified base.

pub mod catalog;
pub mod extensions;
pub mod fetch;
pub mod resolver;

pub use catalog::{SchemaCatalog, SchemaCatalogError};
pub use extensions::{
    json_merge_patch, ExtensionApplier, ExtensionDescriptor, ExtensionOutcome, ResolvedSchema,
};
pub use fetch::{ExtensionFetcher, FetchFailure, HttpExtensionFetcher, StaticFetcher};
pub use resolver::{VersionAdvisory, VersionError, VersionResolution, VersionResolver};
