//! Core domain models for batchup
//!
//! This module contains the fundamental types used throughout the pipeline:
//! - Dependency and requirement structures
//! - Package version parsing and ordering
//! - Registry and source-control credentials
//! - Eligibility decisions and update candidates
//! - Update groups and run summaries

mod credential;
mod dependency;
mod dependency_file;
mod group;
mod summary;
mod update;
mod version;

pub use credential::{dedup_credentials, Credential, RepositoryDedup};
pub use dependency::{Dependency, Requirement, RequirementMetadata};
pub use dependency_file::{DependencyFile, FetchedFiles};
pub use group::UpdateGroup;
pub use summary::{GroupOutcome, RunSummary, SkipReason, SkippedDependency};
pub use update::{DependencyUpdate, EligibilityDecision, UnlockScope, UpdateCandidate};
pub use version::PackageVersion;
