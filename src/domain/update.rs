//! Eligibility decisions and update candidate structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// The requirement-unlock scope an update may be attempted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockScope {
    /// No requirement files change
    None,
    /// Only the dependency's own requirement files change
    Own,
    /// Any requirement file may change
    All,
}

impl fmt::Display for UnlockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnlockScope::None => write!(f, "none"),
            UnlockScope::Own => write!(f, "own"),
            UnlockScope::All => write!(f, "all"),
        }
    }
}

/// Outcome of classifying one dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityDecision {
    /// Updatable without touching requirement files
    None,
    /// Updatable by changing its own requirement files
    Own,
    /// Updatable only by changing requirement files across the repo
    All,
    /// No unlock scope makes an update possible
    Impossible,
}

impl EligibilityDecision {
    /// The unlock scope to run the update with, if the update is possible
    pub fn unlock_scope(&self) -> Option<UnlockScope> {
        match self {
            EligibilityDecision::None => Some(UnlockScope::None),
            EligibilityDecision::Own => Some(UnlockScope::Own),
            EligibilityDecision::All => Some(UnlockScope::All),
            EligibilityDecision::Impossible => None,
        }
    }
}

impl fmt::Display for EligibilityDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EligibilityDecision::None => write!(f, "none"),
            EligibilityDecision::Own => write!(f, "own"),
            EligibilityDecision::All => write!(f, "all"),
            EligibilityDecision::Impossible => write!(f, "update not possible"),
        }
    }
}

/// A single dependency version transition produced by an update check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyUpdate {
    /// Package name
    pub name: String,
    /// Target version
    pub version: String,
    /// Version before the update
    pub previous_version: String,
    /// Whether this dependency is declared at the top level
    pub top_level: bool,
}

impl DependencyUpdate {
    /// Creates a new dependency update
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        previous_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            previous_version: previous_version.into(),
            top_level: true,
        }
    }

    /// Marks this update as transitive (builder pattern)
    pub fn transitive(mut self) -> Self {
        self.top_level = false;
        self
    }
}

impl fmt::Display for DependencyUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (from {} to {})",
            self.name, self.previous_version, self.version
        )
    }
}

/// A dependency that survived classification, with everything its update pulls in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCandidate {
    /// The update whose name matches the originally checked dependency
    pub primary: DependencyUpdate,
    /// All updates the checker produced, primary included
    pub updated: Vec<DependencyUpdate>,
    /// The unlock scope the updates were computed with
    pub scope: UnlockScope,
}

impl UpdateCandidate {
    /// Creates a new update candidate
    pub fn new(primary: DependencyUpdate, updated: Vec<DependencyUpdate>, scope: UnlockScope) -> Self {
        Self {
            primary,
            updated,
            scope,
        }
    }

    /// `new/previous` suffix shared by the candidate's grouping key and label
    pub fn version_postfix(&self) -> String {
        format!("{}/{}", self.primary.version, self.primary.previous_version)
    }
}
