//! The conversion cache.
//!
//! `convert` is the one entry point: it invalidates any stale artifact,
//! serves a fresh one byte-for-byte, or runs the engine and stores the
//! result tagged with the effective version. All of that happens under a
//! per-key mutex so the invalidate-then-regenerate sequence is atomic with
//! respect to concurrent callers of the same key.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use ocrev_core::{DocumentId, SchemaVersion, SubmittedDocument};

use crate::engine::{ConversionEngine, ConversionError, TargetFormat};
use crate::store::{ConversionMeta, DocumentStore};

/// Failure in the cache layer or the engine beneath it.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The engine could not produce the target format. Nothing is stored.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// An artifact metadata sidecar could not be encoded or decoded.
    #[error("artifact metadata error: {detail}")]
    Meta {
        /// Serde diagnostic.
        detail: String,
    },

    /// Filesystem failure in the artifact store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one cache lookup or conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// The converted bytes.
    pub bytes: Vec<u8>,
    /// Where the artifact lives in the store.
    pub path: PathBuf,
    /// The version recorded with the artifact.
    pub source_version: SchemaVersion,
    /// True when a prior artifact was served without invoking the engine.
    pub cache_hit: bool,
}

/// Disk-backed conversion cache keyed by `(document identity, target format)`.
pub struct ConversionCache {
    store: DocumentStore,
    locks: Mutex<HashMap<(DocumentId, TargetFormat), Arc<Mutex<()>>>>,
}

impl ConversionCache {
    pub fn new(store: DocumentStore) -> Self {
        Self { store, locks: Mutex::new(HashMap::new()) }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    fn key_lock(&self, key: (DocumentId, TargetFormat)) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(key).or_default())
    }

    /// Delete the artifact (and the cached validation report, which shares
    /// the trigger) if its recorded source version differs from
    /// `current_version`. Returns whether anything was invalidated.
    ///
    /// Runs uniformly before every read; callers never compare versions
    /// themselves.
    pub fn invalidate_if_stale(
        &self,
        id: DocumentId,
        target: TargetFormat,
        current_version: SchemaVersion,
    ) -> Result<bool, CacheError> {
        match self.store.read_meta(id, target)? {
            Some(meta) if meta.source_version != current_version => {
                info!(
                    document = %id,
                    stored = %meta.source_version,
                    current = %current_version,
                    "invalidating stale conversion artifact"
                );
                self.store.delete_artifact(id, target)?;
                self.store.delete_validation_report(id)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Serve the artifact for `(document, target)`, converting if needed.
    ///
    /// Cache hit: a prior artifact exists and was produced under
    /// `effective_version` — returned unchanged, engine not invoked.
    /// Otherwise the stale artifact (if any) is deleted, the engine runs,
    /// and the result is stored tagged with `effective_version`. On engine
    /// failure nothing is stored.
    pub fn convert(
        &self,
        document: &SubmittedDocument,
        target: TargetFormat,
        effective_version: SchemaVersion,
        engine: &dyn ConversionEngine,
        schema_url: &str,
    ) -> Result<ConversionOutcome, CacheError> {
        let id = document.id();
        let key_lock = self.key_lock((id, target));
        let _guard = key_lock.lock().unwrap_or_else(|e| e.into_inner());

        self.invalidate_if_stale(id, target, effective_version)?;

        if let Some(meta) = self.store.read_meta(id, target)? {
            // Not stale past this point; a missing artifact file means the
            // sidecar outlived it, so fall through and regenerate.
            if let Some(bytes) = self.store.read_artifact(id, target)? {
                debug!(document = %id, "conversion cache hit");
                let path = self
                    .store
                    .document_dir(id)?
                    .join(target.artifact_name());
                return Ok(ConversionOutcome {
                    bytes,
                    path,
                    source_version: meta.source_version,
                    cache_hit: true,
                });
            }
        }

        let bytes = engine.convert(document, target, schema_url)?;
        let meta = ConversionMeta { source_version: effective_version, created_at: Utc::now() };
        let path = self.store.write_artifact(id, target, &bytes, &meta)?;
        Ok(ConversionOutcome { bytes, path, source_version: effective_version, cache_hit: false })
    }
}
