//! Catalog-backed update checker
//!
//! The engine performs no registry I/O; the surrounding system supplies the
//! known available versions per package as a catalog file. The checker picks
//! the highest catalog version that is newer than the current one, respects
//! the declared ceiling, and skips prereleases unless the dependency is
//! already on one.

use super::{CheckerFactory, UpdateChecker};
use crate::domain::{Dependency, DependencyUpdate, PackageVersion, UnlockScope};
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Known available versions per package, keyed case-insensitively
#[derive(Debug, Clone, Default)]
pub struct VersionCatalog {
    versions: HashMap<String, Vec<PackageVersion>>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(flatten)]
    packages: HashMap<String, Vec<String>>,
}

impl VersionCatalog {
    /// Creates an empty catalog; every dependency then reads as up to date
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file mapping package name to version list
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::invalid_path(path, e.to_string()))?;
        Self::from_json(&content).map_err(|message| ConfigError::invalid_path(path, message))
    }

    /// Parse a catalog from its JSON representation
    ///
    /// Version strings that do not parse are dropped; a catalog entry with no
    /// usable versions behaves like an absent entry.
    pub fn from_json(content: &str) -> Result<Self, String> {
        let file: CatalogFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
        let mut catalog = Self::new();
        for (name, versions) in file.packages {
            for version in versions {
                match PackageVersion::parse(&version) {
                    Some(parsed) => catalog.insert(&name, parsed),
                    None => eprintln!("__ unparseable catalog version {} for {}", version, name),
                }
            }
        }
        Ok(catalog)
    }

    /// Add one known version for a package
    pub fn insert(&mut self, name: &str, version: PackageVersion) {
        self.versions
            .entry(name.to_lowercase())
            .or_default()
            .push(version);
    }

    /// The known versions for a package
    pub fn available(&self, name: &str) -> &[PackageVersion] {
        self.versions
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns true when no package has any known version
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Checker over one dependency and the catalog's selectable versions
pub struct CatalogChecker {
    dependency: Dependency,
    target: Option<PackageVersion>,
}

impl CatalogChecker {
    /// Create a checker, computing the selectable target version up front
    pub fn new(dependency: Dependency, catalog: &VersionCatalog) -> Self {
        let target = Self::select_target(&dependency, catalog);
        Self { dependency, target }
    }

    fn select_target(dependency: &Dependency, catalog: &VersionCatalog) -> Option<PackageVersion> {
        let current = PackageVersion::parse(dependency.version.as_deref()?)?;
        let ceiling = dependency.max_version();

        catalog
            .available(&dependency.name)
            .iter()
            .filter(|v| **v > current)
            .filter(|v| current.is_prerelease() || !v.is_prerelease())
            .filter(|v| ceiling.map(|max| *v < max).unwrap_or(true))
            .max()
            .cloned()
    }
}

impl UpdateChecker for CatalogChecker {
    fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    fn up_to_date(&self) -> bool {
        self.target.is_none()
    }

    fn requirements_unlocked_or_can_be(&self) -> bool {
        // Declarations with a concrete requirement string can be rewritten;
        // an empty requirement means only resolution metadata changes.
        self.dependency
            .requirements
            .iter()
            .any(|req| !req.requirement.is_empty())
    }

    fn can_update(&self, _scope: UnlockScope) -> bool {
        self.target.is_some()
    }

    fn updated_dependencies(&self, _scope: UnlockScope) -> Vec<DependencyUpdate> {
        let Some(target) = &self.target else {
            return Vec::new();
        };
        let previous = self.dependency.version.clone().unwrap_or_default();
        let mut update =
            DependencyUpdate::new(&self.dependency.name, target.original(), previous);
        update.top_level = self.dependency.top_level;
        vec![update]
    }
}

/// Builds catalog checkers for the pipeline
pub struct CatalogCheckerFactory {
    catalog: VersionCatalog,
}

impl CatalogCheckerFactory {
    /// Creates a factory over the given catalog
    pub fn new(catalog: VersionCatalog) -> Self {
        Self { catalog }
    }
}

impl CheckerFactory for CatalogCheckerFactory {
    fn checker_for(&self, dependency: &Dependency) -> Box<dyn UpdateChecker> {
        Box::new(CatalogChecker::new(dependency.clone(), &self.catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Requirement;

    fn catalog(name: &str, versions: &[&str]) -> VersionCatalog {
        let mut catalog = VersionCatalog::new();
        for version in versions {
            catalog.insert(name, PackageVersion::parse(version).unwrap());
        }
        catalog
    }

    fn dep(name: &str, version: &str) -> Dependency {
        Dependency::new(name, version).with_requirement(Requirement::new("App.csproj", version))
    }

    #[test]
    fn test_picks_highest_newer_version() {
        let checker = CatalogChecker::new(
            dep("Sentry", "2.9.0"),
            &catalog("Sentry", &["2.8.0", "2.9.0", "3.0.0", "3.1.0"]),
        );
        assert!(!checker.up_to_date());
        let updates = checker.updated_dependencies(UnlockScope::Own);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].version, "3.1.0");
        assert_eq!(updates[0].previous_version, "2.9.0");
    }

    #[test]
    fn test_ceiling_excludes_versions_at_or_above() {
        let dependency = Dependency::new("Sentry", "1.0.0").with_requirement(
            Requirement::new("App.csproj", "1.0.0")
                .with_max_version(PackageVersion::parse("2.0.0").unwrap()),
        );
        let checker = CatalogChecker::new(
            dependency,
            &catalog("Sentry", &["1.9.9", "2.0.0", "2.1.0"]),
        );
        let updates = checker.updated_dependencies(UnlockScope::Own);
        assert_eq!(updates[0].version, "1.9.9");
    }

    #[test]
    fn test_ceiling_can_rule_out_every_candidate() {
        let dependency = Dependency::new("Sentry", "1.9.9").with_requirement(
            Requirement::new("App.csproj", "1.9.9")
                .with_max_version(PackageVersion::parse("2.0.0").unwrap()),
        );
        let checker =
            CatalogChecker::new(dependency, &catalog("Sentry", &["2.0.0", "2.1.0"]));
        assert!(checker.up_to_date());
    }

    #[test]
    fn test_prerelease_skipped_from_release_version() {
        let checker = CatalogChecker::new(
            dep("Sentry", "2.9.0"),
            &catalog("Sentry", &["3.0.0-beta.1"]),
        );
        assert!(checker.up_to_date());
    }

    #[test]
    fn test_prerelease_selectable_from_prerelease() {
        let checker = CatalogChecker::new(
            dep("Sentry", "3.0.0-alpha.1"),
            &catalog("Sentry", &["3.0.0-beta.1"]),
        );
        assert_eq!(
            checker.updated_dependencies(UnlockScope::Own)[0].version,
            "3.0.0-beta.1"
        );
    }

    #[test]
    fn test_catalog_lookup_is_case_insensitive() {
        let checker = CatalogChecker::new(dep("SENTRY", "2.9.0"), &catalog("sentry", &["3.0.0"]));
        assert!(!checker.up_to_date());
    }

    #[test]
    fn test_empty_catalog_reads_up_to_date() {
        let checker = CatalogChecker::new(dep("Sentry", "2.9.0"), &VersionCatalog::new());
        assert!(checker.up_to_date());
        assert!(checker.updated_dependencies(UnlockScope::Own).is_empty());
    }

    #[test]
    fn test_requirements_unlock_reporting() {
        let with_requirement = CatalogChecker::new(
            dep("Sentry", "2.9.0"),
            &catalog("Sentry", &["3.0.0"]),
        );
        assert!(with_requirement.requirements_unlocked_or_can_be());

        let lock_only = CatalogChecker::new(
            Dependency::new("Sentry", "2.9.0")
                .with_requirement(Requirement::new("App.csproj", "")),
            &catalog("Sentry", &["3.0.0"]),
        );
        assert!(!lock_only.requirements_unlocked_or_can_be());
    }

    #[test]
    fn test_catalog_from_json() {
        let catalog = VersionCatalog::from_json(
            r#"{"Sentry": ["3.0.0", "3.1.0"], "Dapper": ["2.1.0", "not-a-version"]}"#,
        )
        .unwrap();
        assert_eq!(catalog.available("sentry").len(), 2);
        assert_eq!(catalog.available("Dapper").len(), 1);
    }

    #[test]
    fn test_catalog_from_invalid_json() {
        assert!(VersionCatalog::from_json("not json").is_err());
    }

    #[test]
    fn test_four_part_versions_ordered() {
        let checker = CatalogChecker::new(
            dep("Legacy.Package", "4.7.0.5"),
            &catalog("Legacy.Package", &["4.7.0.12", "4.7.0.9"]),
        );
        assert_eq!(
            checker.updated_dependencies(UnlockScope::Own)[0].version,
            "4.7.0.12"
        );
    }
}
