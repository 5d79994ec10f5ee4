//! Update group structures

use super::{DependencyUpdate, UpdateCandidate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A batch of update candidates sharing a prefix and version transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateGroup {
    /// Grouping key: `prefix/new-version/previous-version`
    pub key: String,
    /// Members in the order they were grouped (sorted by primary name)
    pub members: Vec<UpdateCandidate>,
    /// Human-readable label; only present for multi-member groups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UpdateGroup {
    /// Creates a new unnamed group with a single member
    pub fn new(key: impl Into<String>, member: UpdateCandidate) -> Self {
        Self {
            key: key.into(),
            members: vec![member],
            name: None,
        }
    }

    /// Returns true when the group batches more than one candidate
    pub fn is_batched(&self) -> bool {
        self.members.len() > 1
    }

    /// All updates across members, flattened in member order
    pub fn all_updates(&self) -> Vec<DependencyUpdate> {
        self.members
            .iter()
            .flat_map(|m| m.updated.iter().cloned())
            .collect()
    }

    /// Primary dependency names of all members
    pub fn primary_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.primary.name.as_str()).collect()
    }
}

impl fmt::Display for UpdateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({} members)", name, self.members.len()),
            None => write!(f, "{}", self.key),
        }
    }
}
