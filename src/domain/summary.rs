//! Run result summary types
//!
//! Provides structures for tracking what the pipeline decided and applied,
//! consumed by the output formatters.

use super::{DependencyUpdate, UpdateGroup};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason why a dependency never reached the grouping stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No resolvable version; managed in a submodule or elsewhere
    ManagedInSubmodule,
    /// Version delegated to an external property
    ManagedExternally,
    /// Already at the latest selectable version
    UpToDate,
    /// Name appears on the ignore list
    Ignored,
    /// Classifier found no unlock scope that permits an update
    UpdateNotPossible,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ManagedInSubmodule => write!(f, "managed in submodule"),
            SkipReason::ManagedExternally => write!(f, "managed externally"),
            SkipReason::UpToDate => write!(f, "up to date"),
            SkipReason::Ignored => write!(f, "ignoring"),
            SkipReason::UpdateNotPossible => write!(f, "update not possible"),
        }
    }
}

/// A dependency that was skipped, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDependency {
    /// Package name
    pub name: String,
    /// Current version, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Why it was skipped
    pub reason: SkipReason,
}

impl SkippedDependency {
    /// Creates a new skipped-dependency record
    pub fn new(name: impl Into<String>, version: Option<String>, reason: SkipReason) -> Self {
        Self {
            name: name.into(),
            version,
            reason,
        }
    }
}

/// Outcome of applying one update group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOutcome {
    /// Grouping key
    pub key: String,
    /// Group label, present for batched groups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// All updates in the group, flattened
    pub updates: Vec<DependencyUpdate>,
    /// Whether the external tool ran for this group (false in dry-run)
    pub applied: bool,
    /// Files the external tool changed, deduplicated
    pub changed_files: Vec<String>,
}

impl GroupOutcome {
    /// Creates an outcome record for a group that has not been applied yet
    pub fn pending(group: &UpdateGroup) -> Self {
        Self {
            key: group.key.clone(),
            label: group.name.clone(),
            updates: group.all_updates(),
            applied: false,
            changed_files: Vec::new(),
        }
    }
}

/// Overall summary of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Base commit the dependency files were read at
    pub base_commit: String,
    /// Dependencies that never reached grouping
    pub skipped: Vec<SkippedDependency>,
    /// Per-group outcomes, in processing order
    pub groups: Vec<GroupOutcome>,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary
    pub fn new(base_commit: impl Into<String>, dry_run: bool) -> Self {
        Self {
            base_commit: base_commit.into(),
            skipped: Vec::new(),
            groups: Vec::new(),
            dry_run,
        }
    }

    /// Records a skipped dependency
    pub fn add_skip(&mut self, skip: SkippedDependency) {
        self.skipped.push(skip);
    }

    /// Records a group outcome
    pub fn add_group(&mut self, outcome: GroupOutcome) {
        self.groups.push(outcome);
    }

    /// Total number of individual dependency updates across groups
    pub fn total_updates(&self) -> usize {
        self.groups.iter().map(|g| g.updates.len()).sum()
    }

    /// Number of groups the tool actually ran for
    pub fn applied_groups(&self) -> usize {
        self.groups.iter().filter(|g| g.applied).count()
    }
}
