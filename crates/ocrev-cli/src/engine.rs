//! External converter integration.
//!
//! The review kit does not flatten or unflatten documents itself; it invokes
//! a converter executable. The contract is stdin/stdout-free and path-based:
//!
//! ```text
//! <converter> flatten   --schema <URL> <INPUT> <OUTPUT>
//! <converter> unflatten --schema <URL> <INPUT> <OUTPUT>
//! <converter> metadata  <INPUT> <OUTPUT>
//! ```
//!
//! `metadata` writes a JSON object holding the spreadsheet's metadata-tab
//! fields (`version`, `extensions`). A non-zero exit maps the converter's
//! stderr into a typed conversion error.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use ocrev_convert::{ConversionEngine, ConversionError, MetadataExtractor, TargetFormat};
use ocrev_core::{SubmittedDocument, TabularMetadata};

/// Engine that shells out to a converter executable.
#[derive(Debug, Clone)]
pub struct ExternalCommandEngine {
    program: PathBuf,
}

impl ExternalCommandEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    fn run(
        &self,
        subcommand: &str,
        schema_url: Option<&str>,
        input: &[u8],
    ) -> Result<Vec<u8>, ConversionError> {
        let dir = tempfile::tempdir().map_err(|e| ConversionError::Engine {
            detail: format!("failed to create scratch directory: {e}"),
        })?;
        let input_path = dir.path().join("input");
        let output_path = dir.path().join("output");
        std::fs::write(&input_path, input).map_err(|e| ConversionError::Engine {
            detail: format!("failed to stage converter input: {e}"),
        })?;

        let mut command = Command::new(&self.program);
        command.arg(subcommand);
        if let Some(url) = schema_url {
            command.arg("--schema").arg(url);
        }
        command.arg(&input_path).arg(&output_path);
        debug!(program = %self.program.display(), subcommand, "invoking converter");

        let output = command.output().map_err(|e| ConversionError::Engine {
            detail: format!("failed to launch '{}': {e}", self.program.display()),
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionError::UnconvertibleShape {
                detail: stderr.trim().to_owned(),
            });
        }

        std::fs::read(&output_path).map_err(|e| ConversionError::Engine {
            detail: format!("converter produced no output: {e}"),
        })
    }
}

impl ConversionEngine for ExternalCommandEngine {
    fn convert(
        &self,
        document: &SubmittedDocument,
        target: TargetFormat,
        schema_url: &str,
    ) -> Result<Vec<u8>, ConversionError> {
        let subcommand = match target {
            TargetFormat::Tabular => "flatten",
            TargetFormat::Json => "unflatten",
        };
        self.run(subcommand, Some(schema_url), document.bytes())
    }
}

impl MetadataExtractor for ExternalCommandEngine {
    fn extract_metadata(
        &self,
        document: &SubmittedDocument,
    ) -> Result<TabularMetadata, ConversionError> {
        let bytes = self.run("metadata", None, document.bytes())?;
        let meta: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| ConversionError::Engine {
                detail: format!("converter metadata output is not JSON: {e}"),
            })?;
        Ok(TabularMetadata::from_meta_object(&meta))
    }
}
