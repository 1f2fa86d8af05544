//! # ocrev-convert — Conversion Artifacts and Their Cache
//!
//! Converts a submitted document to its complementary representation (JSON ↔
//! tabular) through an external engine, and caches the result on disk keyed
//! by document identity and target format.
//!
//! ## Staleness Invariant
//!
//! An artifact records the schema version it was produced under. It is never
//! served if that version differs from the current effective version:
//! [`cache::ConversionCache::invalidate_if_stale`] runs before every read and
//! deletes the artifact, its metadata, and the cached validation report in
//! one sweep. Invalidation is a first-class operation, not a scattered
//! conditional delete.
//!
//! ## Concurrency
//!
//! At most one in-flight conversion per key: concurrent callers for the same
//! `(document, target)` pair serialize on a per-key mutex, so a reader can
//! never observe a deleted-but-not-yet-regenerated artifact and redundant
//! conversions of the same key are avoided.

pub mod cache;
pub mod engine;
pub mod store;

pub use cache::{CacheError, ConversionCache, ConversionOutcome};
pub use engine::{ConversionEngine, ConversionError, MetadataExtractor, TargetFormat};
pub use store::{ConversionMeta, DocumentStore};
