//! Schema versions and the immutable version registry.
//!
//! The schema family publishes a closed, ordered set of `major.minor`
//! versions. Exactly one version is effective per review run; it selects the
//! base schema locations everything downstream (extension merging, conversion,
//! structural validation) is keyed on.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A `major.minor` schema version.
///
/// Ordering follows the numeric components, so `1.0 < 1.1 < 1.10`.
/// Serializes as the canonical string form (`"1.1"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaVersion {
    major: u16,
    minor: u16,
}

impl SchemaVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u16 {
        self.major
    }

    pub fn minor(&self) -> u16 {
        self.minor
    }

    /// Parse a strict `major.minor` string. Anything else — including the
    /// common `major.minor.patch` mistake — returns `None`; distinguishing
    /// those shapes is the version resolver's job.
    ///
    /// Only the canonical rendering matches: a segment with a leading zero
    /// (`"01.1"`) is not a member of the known string set.
    pub fn parse_exact(s: &str) -> Option<Self> {
        let (major, minor) = s.split_once('.')?;
        Some(Self {
            major: parse_segment(major)?,
            minor: parse_segment(minor)?,
        })
    }
}

fn parse_segment(s: &str) -> Option<u16> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_exact(&s)
            .ok_or_else(|| D::Error::custom(format!("invalid schema version: {s}")))
    }
}

/// Canonical base-schema locations for one known version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionSpec {
    /// The version these locations belong to.
    pub version: SchemaVersion,
    /// Release schema (the per-release object schema).
    pub release_schema_url: String,
    /// Release package schema (the top-level wrapper for releases).
    pub release_pkg_schema_url: String,
    /// Record package schema (the top-level wrapper for records).
    pub record_pkg_schema_url: String,
}

/// The closed set of known schema versions.
///
/// Built once at process start and passed by reference into each pipeline
/// invocation. Specs are held in ascending version order.
#[derive(Debug, Clone)]
pub struct VersionRegistry {
    specs: Vec<VersionSpec>,
    default_json: SchemaVersion,
    default_tabular: SchemaVersion,
}

impl VersionRegistry {
    /// Build a registry from explicit specs and per-format defaults.
    ///
    /// Specs are sorted by version; both defaults must be members of the set.
    /// Returns `None` if either default is unknown or the set is empty.
    pub fn new(
        mut specs: Vec<VersionSpec>,
        default_json: SchemaVersion,
        default_tabular: SchemaVersion,
    ) -> Option<Self> {
        if specs.is_empty() {
            return None;
        }
        specs.sort_by_key(|s| s.version);
        let known = |v: SchemaVersion| specs.iter().any(|s| s.version == v);
        if !known(default_json) || !known(default_tabular) {
            return None;
        }
        Some(Self { specs, default_json, default_tabular })
    }

    /// The registry for the published standard: versions 1.0 and 1.1.
    ///
    /// JSON input without a version field defaults to 1.1; tabular metadata
    /// without a version cell predates the field and implies 1.0.
    pub fn standard() -> Self {
        let specs = vec![
            VersionSpec {
                version: SchemaVersion::new(1, 0),
                release_schema_url:
                    "https://standard.open-contracting.org/schema/1__0__3/release-schema.json"
                        .to_owned(),
                release_pkg_schema_url:
                    "https://standard.open-contracting.org/schema/1__0__3/release-package-schema.json"
                        .to_owned(),
                record_pkg_schema_url:
                    "https://standard.open-contracting.org/schema/1__0__3/record-package-schema.json"
                        .to_owned(),
            },
            VersionSpec {
                version: SchemaVersion::new(1, 1),
                release_schema_url:
                    "https://standard.open-contracting.org/schema/1__1__5/release-schema.json"
                        .to_owned(),
                release_pkg_schema_url:
                    "https://standard.open-contracting.org/schema/1__1__5/release-package-schema.json"
                        .to_owned(),
                record_pkg_schema_url:
                    "https://standard.open-contracting.org/schema/1__1__5/record-package-schema.json"
                        .to_owned(),
            },
        ];
        // Both defaults are members of the set above.
        Self {
            specs,
            default_json: SchemaVersion::new(1, 1),
            default_tabular: SchemaVersion::new(1, 0),
        }
    }

    /// Look up the spec for a known version.
    pub fn get(&self, version: SchemaVersion) -> Option<&VersionSpec> {
        self.specs.iter().find(|s| s.version == version)
    }

    /// Look up a spec by its strict `major.minor` string form.
    pub fn get_str(&self, s: &str) -> Option<&VersionSpec> {
        SchemaVersion::parse_exact(s).and_then(|v| self.get(v))
    }

    /// True if `version` is in the known set.
    pub fn contains(&self, version: SchemaVersion) -> bool {
        self.get(version).is_some()
    }

    /// All known versions, ascending.
    pub fn known_versions(&self) -> impl Iterator<Item = SchemaVersion> + '_ {
        self.specs.iter().map(|s| s.version)
    }

    /// Default version for JSON input lacking a version field.
    pub fn default_json(&self) -> SchemaVersion {
        self.default_json
    }

    /// Default version for tabular metadata lacking a version cell.
    pub fn default_tabular(&self) -> SchemaVersion {
        self.default_tabular
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_accepts_major_minor_only() {
        assert_eq!(SchemaVersion::parse_exact("1.1"), Some(SchemaVersion::new(1, 1)));
        assert_eq!(SchemaVersion::parse_exact("12.34"), Some(SchemaVersion::new(12, 34)));
        assert_eq!(SchemaVersion::parse_exact("1.1.0"), None);
        assert_eq!(SchemaVersion::parse_exact("1"), None);
        assert_eq!(SchemaVersion::parse_exact("1."), None);
        assert_eq!(SchemaVersion::parse_exact("v1.1"), None);
        assert_eq!(SchemaVersion::parse_exact("1.1 "), None);
    }

    #[test]
    fn test_parse_exact_rejects_leading_zeros() {
        assert_eq!(SchemaVersion::parse_exact("01.1"), None);
        assert_eq!(SchemaVersion::parse_exact("1.01"), None);
        assert_eq!(SchemaVersion::parse_exact("00.0"), None);
        // A bare zero segment is still canonical.
        assert_eq!(SchemaVersion::parse_exact("1.0"), Some(SchemaVersion::new(1, 0)));
    }

    #[test]
    fn test_version_ordering_is_numeric() {
        assert!(SchemaVersion::new(1, 0) < SchemaVersion::new(1, 1));
        assert!(SchemaVersion::new(1, 2) < SchemaVersion::new(1, 10));
    }

    #[test]
    fn test_display_round_trip() {
        let v = SchemaVersion::new(1, 1);
        assert_eq!(SchemaVersion::parse_exact(&v.to_string()), Some(v));
    }

    #[test]
    fn test_serialize_as_string() {
        let s = serde_json::to_string(&SchemaVersion::new(1, 1)).unwrap();
        assert_eq!(s, "\"1.1\"");
        let v: SchemaVersion = serde_json::from_str("\"1.0\"").unwrap();
        assert_eq!(v, SchemaVersion::new(1, 0));
    }

    #[test]
    fn test_standard_registry_contents() {
        let registry = VersionRegistry::standard();
        let known: Vec<_> = registry.known_versions().collect();
        assert_eq!(known, vec![SchemaVersion::new(1, 0), SchemaVersion::new(1, 1)]);
        assert_eq!(registry.default_json(), SchemaVersion::new(1, 1));
        assert_eq!(registry.default_tabular(), SchemaVersion::new(1, 0));
        assert!(registry.get_str("1.1").is_some());
        assert!(registry.get_str("1.2").is_none());
        assert!(registry.get_str("1.1.0").is_none());
    }

    #[test]
    fn test_new_rejects_unknown_default() {
        let specs = VersionRegistry::standard().specs;
        assert!(VersionRegistry::new(
            specs,
            SchemaVersion::new(9, 9),
            SchemaVersion::new(1, 0)
        )
        .is_none());
    }
}
