//! Dependency information structures

use super::PackageVersion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single requirement of a dependency, as declared in one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// File the requirement was declared in (repo-relative)
    pub file: String,
    /// Raw requirement string as written in the file
    pub requirement: String,
    /// Group tags such as "dependencies" / "devDependencies"
    pub groups: Vec<String>,
    /// Metadata discovered while parsing the declaring file
    #[serde(default)]
    pub metadata: RequirementMetadata,
}

/// Additional metadata attached to a requirement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementMetadata {
    /// Property backing this requirement when declared indirectly (`$(Name)`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    /// Resolved version ceiling, when one is declared for this dependency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_version: Option<PackageVersion>,
}

impl Requirement {
    /// Creates a new requirement with the given declaring file and raw string
    pub fn new(file: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            requirement: requirement.into(),
            groups: vec!["dependencies".to_string()],
            metadata: RequirementMetadata::default(),
        }
    }

    /// Sets the group tags (builder pattern)
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }

    /// Sets the backing property name (builder pattern)
    pub fn with_property_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.property_name = Some(name.into());
        self
    }

    /// Sets the resolved version ceiling (builder pattern)
    pub fn with_max_version(mut self, max: PackageVersion) -> Self {
        self.metadata.max_version = Some(max);
        self
    }
}

/// Represents a package dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name; lookups treat the name case-insensitively
    pub name: String,
    /// Current version; None means the dependency is managed elsewhere
    pub version: Option<String>,
    /// Requirements from each declaring file, in scan order
    pub requirements: Vec<Requirement>,
    /// Whether this dependency is declared at the top level
    pub top_level: bool,
}

impl Dependency {
    /// Creates a new top-level dependency
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
            requirements: Vec::new(),
            top_level: true,
        }
    }

    /// Creates a dependency without a resolvable version (managed elsewhere)
    pub fn unversioned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            requirements: Vec::new(),
            top_level: true,
        }
    }

    /// Adds a requirement (builder pattern)
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Marks this dependency as transitive (builder pattern)
    pub fn transitive(mut self) -> Self {
        self.top_level = false;
        self
    }

    /// Lowercased name used for case-insensitive lookups
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Returns true if the name matches, ignoring case
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }

    /// Returns true when the version is delegated to an external property
    ///
    /// A version written as `$(SomeProperty)` cannot be edited in place by a
    /// direct update.
    pub fn externally_managed(&self) -> bool {
        matches!(&self.version, Some(v) if v.starts_with('$'))
    }

    /// The smallest ceiling declared across this dependency's requirements
    pub fn max_version(&self) -> Option<&PackageVersion> {
        self.requirements
            .iter()
            .filter_map(|req| req.metadata.max_version.as_ref())
            .min()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {}", self.name, version),
            None => write!(f, "{} (unversioned)", self.name),
        }
    }
}
