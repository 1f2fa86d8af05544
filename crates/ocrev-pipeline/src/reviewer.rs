//! The reviewer: one entry point per submitted document.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use ocrev_checks::{
    CheckCategory, Severity, ValidationAggregator, ValidationIssue, ValidationReport,
};
use ocrev_convert::{
    CacheError, ConversionCache, ConversionEngine, ConversionError, MetadataExtractor,
    TargetFormat,
};
use ocrev_core::{
    declared_extensions, package_shape, DocumentError, DocumentId, PackageShape, SchemaVersion,
    SourceFormat, SubmittedDocument, VersionRegistry, VersionSpec,
};
use ocrev_schema::{
    ExtensionApplier, ExtensionDescriptor, ExtensionFetcher, ResolvedSchema, SchemaCatalog,
    VersionAdvisory, VersionError, VersionResolution, VersionResolver,
};

use crate::error::ReviewError;

/// Where a conversion artifact ended up.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    /// The format that was produced.
    pub target: TargetFormat,
    /// Artifact location in the document store.
    pub path: PathBuf,
    /// True when a prior artifact was served without reconversion.
    pub cache_hit: bool,
}

/// Everything one review run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub document_id: DocumentId,
    pub shape: PackageShape,
    /// The effective schema version the run was validated against.
    pub version: SchemaVersion,
    /// Set when the embedded version field could not be honored.
    pub version_advisory: Option<VersionAdvisory>,
    /// Every declared extension with its applied/failed outcome.
    pub extensions: Vec<ExtensionDescriptor>,
    /// The converted counterpart, when one was produced.
    pub conversion: Option<ConversionSummary>,
    /// Why conversion failed, when it did. Non-fatal: the document is still
    /// reviewable without its converted counterpart.
    pub conversion_failure: Option<ConversionError>,
    pub report: ValidationReport,
}

/// Runs the review pipeline. Holds only borrowed collaborators; one
/// reviewer can serve many documents.
pub struct Reviewer<'a> {
    registry: &'a VersionRegistry,
    catalog: &'a SchemaCatalog,
    cache: &'a ConversionCache,
    fetcher: &'a dyn ExtensionFetcher,
    engine: &'a dyn ConversionEngine,
    extractor: &'a dyn MetadataExtractor,
    aggregator: ValidationAggregator,
}

impl<'a> Reviewer<'a> {
    pub fn new(
        registry: &'a VersionRegistry,
        catalog: &'a SchemaCatalog,
        cache: &'a ConversionCache,
        fetcher: &'a dyn ExtensionFetcher,
        engine: &'a dyn ConversionEngine,
        extractor: &'a dyn MetadataExtractor,
    ) -> Self {
        Self {
            registry,
            catalog,
            cache,
            fetcher,
            engine,
            extractor,
            aggregator: ValidationAggregator::new(),
        }
    }

    /// Replace the standard heuristic checks.
    pub fn with_aggregator(mut self, aggregator: ValidationAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Review one document.
    ///
    /// `version_override` is a caller re-selection of the schema version; it
    /// must name a known version exactly.
    pub fn review(
        &self,
        document: &SubmittedDocument,
        version_override: Option<&str>,
    ) -> Result<ReviewOutcome, ReviewError> {
        info!(document = %document.id(), format = %document.format(), "review started");
        let outcome = match document.format() {
            SourceFormat::Json => self.review_json(document, version_override),
            SourceFormat::Spreadsheet(_) => self.review_tabular(document, version_override),
        }?;
        info!(
            document = %document.id(),
            version = %outcome.version,
            errors = outcome.report.error_count,
            warnings = outcome.report.warning_count,
            "review complete"
        );
        Ok(outcome)
    }

    fn review_json(
        &self,
        document: &SubmittedDocument,
        version_override: Option<&str>,
    ) -> Result<ReviewOutcome, ReviewError> {
        let package = document.parse_json()?;
        // Wrapper is mandatory on the JSON path.
        let shape = package_shape(&package)?;

        let resolution = VersionResolver::new(self.registry).resolve(
            version_override,
            package.get("version"),
            self.registry.default_json(),
        )?;
        let spec = self.version_spec(resolution.version)?;

        let resolved = self.resolve_schema(&resolution, shape, &declared_extensions(&package))?;

        // Stale artifacts and the cached report share one invalidation
        // trigger, applied before any read even when conversion is skipped.
        self.cache
            .invalidate_if_stale(document.id(), TargetFormat::Tabular, resolution.version)?;

        // Record packages are validated but never converted.
        let (conversion, conversion_failure) = if shape == PackageShape::RecordPackage {
            (None, None)
        } else {
            match self.cache.convert(
                document,
                TargetFormat::Tabular,
                resolution.version,
                self.engine,
                &spec.release_schema_url,
            ) {
                Ok(outcome) => (
                    Some(ConversionSummary {
                        target: TargetFormat::Tabular,
                        path: outcome.path,
                        cache_hit: outcome.cache_hit,
                    }),
                    None,
                ),
                // A document without its flattened counterpart is still
                // reviewable; report the failure and continue.
                Err(CacheError::Conversion(e)) => {
                    warn!(document = %document.id(), error = %e, "conversion failed");
                    (None, Some(e))
                }
                Err(other) => return Err(other.into()),
            }
        };

        let report =
            self.aggregator
                .validate(&package, &resolved, resolution.advisory.as_ref())?;
        self.persist_report(document.id(), &report)?;

        Ok(ReviewOutcome {
            document_id: document.id(),
            shape,
            version: resolution.version,
            version_advisory: resolution.advisory,
            extensions: resolved.extensions,
            conversion,
            conversion_failure,
            report,
        })
    }

    fn review_tabular(
        &self,
        document: &SubmittedDocument,
        version_override: Option<&str>,
    ) -> Result<ReviewOutcome, ReviewError> {
        let meta = self.extractor.extract_metadata(document)?;

        let resolution = VersionResolver::new(self.registry).resolve(
            version_override,
            meta.version.as_ref(),
            self.registry.default_tabular(),
        )?;
        let spec = self.version_spec(resolution.version)?;

        // Flattened data is always release-shaped.
        let shape = PackageShape::ReleasePackage;
        let resolved = self.resolve_schema(&resolution, shape, &meta.extensions)?;

        self.cache
            .invalidate_if_stale(document.id(), TargetFormat::Json, resolution.version)?;

        // Tabular input must convert before anything can be validated, so a
        // conversion failure here is fatal (CacheError::Conversion included).
        let converted = self.cache.convert(
            document,
            TargetFormat::Json,
            resolution.version,
            self.engine,
            &spec.release_schema_url,
        )?;
        let package: Value = serde_json::from_slice(&converted.bytes)
            .map_err(|e| ReviewError::ConvertedUnreadable { detail: e.to_string() })?;

        let mut report =
            self.aggregator
                .validate(&package, &resolved, resolution.advisory.as_ref())?;
        // Advisory-only for tabular input, which has no wrapper by
        // construction; the engine should have added one.
        if matches!(package_shape(&package), Err(DocumentError::MissingPackageWrapper)) {
            let mut issues = report.issues;
            issues.push(ValidationIssue {
                pointer: String::new(),
                message: "the converted data has no releases section at the top level"
                    .to_owned(),
                rule: "package-wrapper".to_owned(),
                severity: Severity::Warning,
                category: CheckCategory::Advisory,
            });
            report = ValidationReport::from_issues(issues);
        }
        self.persist_report(document.id(), &report)?;

        Ok(ReviewOutcome {
            document_id: document.id(),
            shape,
            version: resolution.version,
            version_advisory: resolution.advisory,
            extensions: resolved.extensions,
            conversion: Some(ConversionSummary {
                target: TargetFormat::Json,
                path: converted.path,
                cache_hit: converted.cache_hit,
            }),
            conversion_failure: None,
            report,
        })
    }

    fn version_spec(&self, version: SchemaVersion) -> Result<&VersionSpec, ReviewError> {
        // The resolver only returns members of the same registry, so a miss
        // here means the caller wired mismatched registries together.
        self.registry.get(version).ok_or_else(|| {
            ReviewError::Version(VersionError::InvalidArgument {
                supplied: version.to_string(),
            })
        })
    }

    fn resolve_schema(
        &self,
        resolution: &VersionResolution,
        shape: PackageShape,
        extension_urls: &[String],
    ) -> Result<ResolvedSchema, ReviewError> {
        let base = self.catalog.package_schema(shape, resolution.version)?;
        Ok(ExtensionApplier::new(self.fetcher).apply(resolution.version, base, extension_urls))
    }

    fn persist_report(&self, id: DocumentId, report: &ValidationReport) -> Result<(), ReviewError> {
        let bytes = serde_json::to_vec_pretty(report)
            .map_err(|e| ReviewError::ReportEncoding { detail: e.to_string() })?;
        self.cache.store().write_validation_report(id, &bytes)?;
        Ok(())
    }
}
