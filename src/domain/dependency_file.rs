//! Fetched dependency file structures

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A dependency file fetched from the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFile {
    /// Repo-relative file name, forward slashes
    pub name: String,
    /// Full file content
    pub content: String,
}

impl DependencyFile {
    /// Creates a new dependency file
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// The flat file set handed to the pipeline, plus its base commit
#[derive(Debug, Clone)]
pub struct FetchedFiles {
    /// All collected dependency files
    pub files: Vec<DependencyFile>,
    /// Identifier of the state the files were read from (commit or content hash)
    pub base_commit: String,
}

impl FetchedFiles {
    /// Creates a new fetched file set
    pub fn new(files: Vec<DependencyFile>, base_commit: impl Into<String>) -> Self {
        Self {
            files,
            base_commit: base_commit.into(),
        }
    }

    /// Stable fingerprint of the file set, used as a per-run cache key
    ///
    /// Only needs to distinguish file sets within one process lifetime, so a
    /// non-cryptographic hash over sorted (name, content) pairs is enough.
    pub fn fingerprint(&self) -> u64 {
        let mut entries: Vec<(&str, &str)> = self
            .files
            .iter()
            .map(|f| (f.name.as_str(), f.content.as_str()))
            .collect();
        entries.sort();

        let mut hasher = DefaultHasher::new();
        for (name, content) in entries {
            name.hash(&mut hasher);
            content.hash(&mut hasher);
        }
        hasher.finish()
    }
}
