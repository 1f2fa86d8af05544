//! The per-document artifact store.
//!
//! Every submitted document owns one directory under the store root, named by
//! its identity, holding the conversion artifacts under fixed names plus the
//! cached validation report. Fixed names are the point: repeated runs on the
//! same document identity locate prior artifacts deterministically.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use ocrev_core::{DocumentId, SchemaVersion};

use crate::cache::CacheError;
use crate::engine::TargetFormat;

/// Cached validation report filename inside the per-document directory.
pub const VALIDATION_REPORT_NAME: &str = "validation_report.json";

/// Sidecar metadata recorded next to each conversion artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionMeta {
    /// The effective schema version the artifact was produced under.
    pub source_version: SchemaVersion,
    /// When the conversion ran.
    pub created_at: DateTime<Utc>,
}

/// Filesystem layout for per-document artifacts.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory owned by one document, created on demand.
    pub fn document_dir(&self, id: DocumentId) -> Result<PathBuf, CacheError> {
        let dir = self.root.join(id.to_string());
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn artifact_path(&self, id: DocumentId, target: TargetFormat) -> Result<PathBuf, CacheError> {
        Ok(self.document_dir(id)?.join(target.artifact_name()))
    }

    fn meta_path(&self, id: DocumentId, target: TargetFormat) -> Result<PathBuf, CacheError> {
        Ok(self.document_dir(id)?.join(target.meta_name()))
    }

    /// Read a stored artifact, or `None` if it has never been produced.
    pub fn read_artifact(
        &self,
        id: DocumentId,
        target: TargetFormat,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.artifact_path(id, target)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write an artifact and its metadata sidecar.
    pub fn write_artifact(
        &self,
        id: DocumentId,
        target: TargetFormat,
        bytes: &[u8],
        meta: &ConversionMeta,
    ) -> Result<PathBuf, CacheError> {
        let path = self.artifact_path(id, target)?;
        std::fs::write(&path, bytes)?;
        let meta_json = serde_json::to_vec_pretty(meta)
            .map_err(|e| CacheError::Meta { detail: e.to_string() })?;
        std::fs::write(self.meta_path(id, target)?, meta_json)?;
        debug!(document = %id, artifact = target.artifact_name(), "artifact stored");
        Ok(path)
    }

    /// Read the metadata sidecar, or `None` if the artifact was never
    /// produced. A sidecar that exists but cannot be parsed is an error —
    /// silently treating it as absent would defeat staleness tracking.
    pub fn read_meta(
        &self,
        id: DocumentId,
        target: TargetFormat,
    ) -> Result<Option<ConversionMeta>, CacheError> {
        let path = self.meta_path(id, target)?;
        match std::fs::read(&path) {
            Ok(bytes) => {
                let meta = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::Meta { detail: e.to_string() })?;
                Ok(Some(meta))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an artifact and its metadata sidecar. Missing files are fine.
    pub fn delete_artifact(&self, id: DocumentId, target: TargetFormat) -> Result<(), CacheError> {
        remove_if_present(&self.artifact_path(id, target)?)?;
        remove_if_present(&self.meta_path(id, target)?)?;
        Ok(())
    }

    /// Path of the cached validation report.
    pub fn validation_report_path(&self, id: DocumentId) -> Result<PathBuf, CacheError> {
        Ok(self.document_dir(id)?.join(VALIDATION_REPORT_NAME))
    }

    /// Read the cached validation report, or `None` if absent.
    pub fn read_validation_report(&self, id: DocumentId) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.validation_report_path(id)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the validation report side file.
    pub fn write_validation_report(&self, id: DocumentId, bytes: &[u8]) -> Result<(), CacheError> {
        std::fs::write(self.validation_report_path(id)?, bytes)?;
        Ok(())
    }

    /// Delete the cached validation report. Shares the invalidation trigger
    /// with conversion artifacts: a stale report is never served.
    pub fn delete_validation_report(&self, id: DocumentId) -> Result<(), CacheError> {
        remove_if_present(&self.validation_report_path(id)?)
    }
}

fn remove_if_present(path: &Path) -> Result<(), CacheError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
