//! # ocrev-pipeline — The Review Pipeline
//!
//! Sequential composition of the review stages for one submitted document:
//! version resolution → extension merging → cached conversion → validation
//! aggregation → grouped report. No internal parallelism; callers that need
//! cancellation wrap the whole invocation.
//!
//! ## Propagation Policy
//!
//! Fatal errors (unparseable input, missing package wrapper on the JSON
//! path, unknown version override, uncompilable schema) short-circuit the
//! remaining stages as one typed [`ReviewError`]. Non-fatal findings —
//! malformed embedded versions, failed extensions, a failed JSON→tabular
//! conversion — accumulate into the outcome and the run completes.

pub mod error;
pub mod reviewer;

pub use error::ReviewError;
pub use reviewer::{ConversionSummary, ReviewOutcome, Reviewer};
