//! # Review Subcommand
//!
//! Runs one submitted file through the full pipeline and prints the outcome
//! as pretty JSON. The process exits non-zero when the report contains
//! validation errors, so the command slots into CI.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use uuid::Uuid;

use ocrev_convert::{ConversionCache, DocumentStore};
use ocrev_core::{DocumentId, SourceFormat, SubmittedDocument, VersionRegistry};
use ocrev_pipeline::Reviewer;
use ocrev_schema::{HttpExtensionFetcher, SchemaCatalog};

use crate::engine::ExternalCommandEngine;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Arguments for the review subcommand.
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// The submission to review (.json, .xlsx, .csv, or .ods).
    pub file: PathBuf,

    /// Review against this schema version instead of the one declared in
    /// the data. Must name a known version exactly (e.g. "1.1").
    #[arg(long)]
    pub version: Option<String>,

    /// Directory holding the package schema files.
    #[arg(long, default_value = "schemas")]
    pub schema_dir: PathBuf,

    /// Root of the per-document artifact store.
    #[arg(long, default_value = "review-store")]
    pub store: PathBuf,

    /// Converter executable used for flattening and unflattening.
    #[arg(long, default_value = "flatten-tool")]
    pub converter: PathBuf,

    /// Stable identity for this submission. Reuse the same identity across
    /// runs to share conversion artifacts; defaults to a fresh one.
    #[arg(long)]
    pub id: Option<Uuid>,
}

/// Execute the review subcommand.
pub fn run(args: ReviewArgs) -> anyhow::Result<()> {
    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid file path: {}", args.file.display()))?;
    let format = SourceFormat::from_file_name(file_name)
        .with_context(|| format!("unsupported file type: {file_name}"))?;
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let id = args.id.map(DocumentId::from_uuid).unwrap_or_else(DocumentId::random);
    let document = SubmittedDocument::new(id, format, bytes);

    let registry = VersionRegistry::standard();
    let catalog = SchemaCatalog::new(&args.schema_dir)
        .with_context(|| format!("failed to load schemas from {}", args.schema_dir.display()))?;
    let cache = ConversionCache::new(DocumentStore::new(&args.store));
    let fetcher =
        HttpExtensionFetcher::new(FETCH_TIMEOUT).context("failed to build extension fetcher")?;
    let engine = ExternalCommandEngine::new(&args.converter);

    let reviewer = Reviewer::new(&registry, &catalog, &cache, &fetcher, &engine, &engine);
    let outcome = reviewer.review(&document, args.version.as_deref())?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if outcome.report.error_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ReviewArgs,
    }

    #[test]
    fn test_defaults() {
        let h = Harness::parse_from(["ocrev", "data.json"]);
        assert_eq!(h.args.file, PathBuf::from("data.json"));
        assert_eq!(h.args.schema_dir, PathBuf::from("schemas"));
        assert_eq!(h.args.store, PathBuf::from("review-store"));
        assert!(h.args.version.is_none());
        assert!(h.args.id.is_none());
    }

    #[test]
    fn test_version_and_id_flags() {
        let h = Harness::parse_from([
            "ocrev",
            "data.xlsx",
            "--version",
            "1.0",
            "--id",
            "00000000-0000-0000-0000-000000000001",
        ]);
        assert_eq!(h.args.version.as_deref(), Some("1.0"));
        assert!(h.args.id.is_some());
    }
}
