//! Dependency file collection and discovery output reading
//!
//! This module provides:
//! - The `FileFetcher` collaborator seam and a local-directory implementation
//! - Deserialization of the external tool's discovery output
//! - A per-run discovery cache keyed by a file-set fingerprint

use crate::domain::{Dependency, DependencyFile, FetchedFiles, Requirement};
use crate::error::FetchError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Directories never descended into during the file walk
const SKIPPED_DIRS: &[&str] = &[".git", "bin", "obj", "node_modules", "packages"];

/// File extensions collected as dependency files
const RELEVANT_EXTENSIONS: &[&str] = &["csproj", "vbproj", "fsproj", "props", "targets", "sln"];

/// Fetches the flat dependency file set the pipeline operates on
///
/// Hosting-provider implementations live outside this crate; the trait is
/// the seam they plug into.
pub trait FileFetcher {
    /// Collect all dependency files plus a base identifier
    fn fetch(&self) -> Result<FetchedFiles, FetchError>;
}

/// Reads dependency files from a local repository checkout
pub struct LocalFileFetcher {
    root: PathBuf,
}

impl LocalFileFetcher {
    /// Creates a fetcher over the given repository root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collect(&self, dir: &Path, files: &mut Vec<DependencyFile>) -> Result<(), FetchError> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| FetchError::read_error(dir, e))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FetchError::read_error(dir, e))?;
            paths.push(entry.path());
        }
        // Deterministic scan order regardless of filesystem enumeration
        paths.sort();

        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            if path.is_dir() {
                if !SKIPPED_DIRS.contains(&name.as_str()) {
                    self.collect(&path, files)?;
                }
                continue;
            }

            if !is_relevant(&name) {
                continue;
            }

            let content = std::fs::read_to_string(&path)
                .map_err(|e| FetchError::read_error(&path, e))?;
            let relative = path
                .strip_prefix(&self.root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            files.push(DependencyFile::new(relative, content));
        }
        Ok(())
    }

    /// The repository's HEAD commit, when the root is a git checkout
    fn git_head(&self) -> Option<String> {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(&self.root)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let head = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!head.is_empty()).then_some(head)
    }
}

fn is_relevant(name: &str) -> bool {
    if name.eq_ignore_ascii_case("nuget.config") {
        return true;
    }
    name.rsplit_once('.')
        .map(|(_, ext)| {
            RELEVANT_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false)
}

impl FileFetcher for LocalFileFetcher {
    fn fetch(&self) -> Result<FetchedFiles, FetchError> {
        if !self.root.is_dir() {
            return Err(FetchError::root_not_found(&self.root));
        }

        let mut files = Vec::new();
        self.collect(&self.root.clone(), &mut files)?;

        let mut fetched = FetchedFiles::new(files, String::new());
        fetched.base_commit = self
            .git_head()
            .unwrap_or_else(|| format!("{:016x}", fetched.fingerprint()));
        Ok(fetched)
    }
}

/// The discovery output file the external tool writes
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryOutput {
    /// Projects found in the workspace
    #[serde(default)]
    pub projects: Vec<DiscoveredProject>,
}

/// One project in the discovery output
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveredProject {
    /// Project file path, repo-relative
    pub path: String,
    /// Dependencies declared or resolved in this project
    #[serde(default)]
    pub dependencies: Vec<DiscoveredDependency>,
}

/// One dependency entry in the discovery output
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveredDependency {
    /// Package name
    pub name: String,
    /// Resolved version; absent for externally managed entries
    #[serde(default)]
    pub version: Option<String>,
    /// Whether the dependency is transitive in this project
    #[serde(default, rename = "isTransitive")]
    pub is_transitive: bool,
    /// Whether the dependency is a development dependency
    #[serde(default, rename = "isDevDependency")]
    pub is_dev: bool,
}

/// Read and deserialize the discovery output file
pub fn read_discovery_output(path: &Path) -> Result<DiscoveryOutput, FetchError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FetchError::DiscoveryOutputMissing {
                path: path.to_path_buf(),
            }
        } else {
            FetchError::read_error(path, e)
        }
    })?;
    serde_json::from_str(&content).map_err(|e| FetchError::discovery_parse_error(path, e.to_string()))
}

/// Fold the discovery output into the domain dependency list
///
/// Entries are merged case-insensitively by name across projects; each
/// declaring project contributes one requirement. A dependency is top-level
/// when any project declares it directly.
pub fn dependencies_from_discovery(output: &DiscoveryOutput) -> Vec<Dependency> {
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, Dependency> = HashMap::new();

    for project in &output.projects {
        for entry in &project.dependencies {
            let key = entry.name.to_lowercase();
            let dep = merged.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                let mut dep = match &entry.version {
                    Some(version) => Dependency::new(&entry.name, version),
                    None => Dependency::unversioned(&entry.name),
                };
                dep.top_level = false;
                dep
            });

            if !entry.is_transitive {
                dep.top_level = true;
                if dep.version.is_none() {
                    dep.version = entry.version.clone();
                }
            }

            let group = if entry.is_dev {
                "devDependencies"
            } else {
                "dependencies"
            };
            let mut requirement =
                Requirement::new(&project.path, entry.version.clone().unwrap_or_default())
                    .with_groups(vec![group.to_string()]);
            if let Some(property) = backing_property(entry.version.as_deref()) {
                requirement = requirement.with_property_name(property);
            }
            dep.requirements.push(requirement);
        }
    }

    order
        .into_iter()
        .filter_map(|key| merged.remove(&key))
        .collect()
}

/// The property name backing an indirect version declaration (`$(Name)`)
fn backing_property(version: Option<&str>) -> Option<&str> {
    version?.strip_prefix("$(")?.strip_suffix(')')
}

/// Per-run cache of discovery results keyed by file-set fingerprint
///
/// Discovery shells out to the external tool, so the same file set is never
/// discovered twice within one run.
#[derive(Default)]
pub struct DiscoveryCache {
    entries: HashMap<u64, Vec<Dependency>>,
}

impl DiscoveryCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dependency list or run discovery and cache it
    pub fn get_or_discover<F, E>(
        &mut self,
        files: &FetchedFiles,
        discover: F,
    ) -> Result<Vec<Dependency>, E>
    where
        F: FnOnce() -> Result<Vec<Dependency>, E>,
    {
        let key = files.fingerprint();
        if let Some(cached) = self.entries.get(&key) {
            return Ok(cached.clone());
        }
        let dependencies = discover()?;
        self.entries.insert(key, dependencies.clone());
        Ok(dependencies)
    }
}
