//! # ocrev-cli — Review Kit Command-Line Interface
//!
//! Thin front end over the review pipeline.
//!
//! ## Subcommands
//!
//! - `review` — Run one submission through version resolution, extension
//!   merging, cached conversion, and validation; print the grouped report
//! - `versions` — List the schema versions this build knows about
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the domain crates — no validation or
//!   conversion logic lives here.
//! - Flattening and unflattening are delegated to an external converter
//!   command; see [`engine`].

pub mod engine;
pub mod review;
pub mod versions;
