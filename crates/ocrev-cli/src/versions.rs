//! # Versions Subcommand
//!
//! Lists the schema versions this build knows about, with their per-format
//! defaults marked.

use ocrev_core::VersionRegistry;

/// Execute the versions subcommand.
pub fn run() -> anyhow::Result<()> {
    let registry = VersionRegistry::standard();
    for version in registry.known_versions() {
        let mut line = version.to_string();
        if version == registry.default_json() {
            line.push_str("  (default for JSON)");
        }
        if version == registry.default_tabular() {
            line.push_str("  (default for spreadsheets)");
        }
        println!("{line}");
    }
    Ok(())
}
