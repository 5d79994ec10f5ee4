//! Pipeline orchestrator coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: fetch → constraints → discover → classify →
//!   group → apply
//! - Dry-run mode support
//! - Change hand-off to the surrounding system through `ChangeApplier`
//!
//! The pipeline is strictly sequential; its only blocking point is the
//! external tool subprocess.

use crate::cli::CliArgs;
use crate::constraint::ConstraintResolver;
use crate::domain::{Dependency, FetchedFiles, GroupOutcome, RunSummary, UpdateGroup};
use crate::eligibility::{CheckerFactory, EligibilityClassifier, Selection};
use crate::error::{AppError, ConfigError};
use crate::fetch::{
    dependencies_from_discovery, read_discovery_output, DiscoveryCache, FileFetcher,
};
use crate::grouping::group_candidates;
use crate::invoker::{ToolInvoker, UpdateJob};
use crate::progress::Progress;
use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Receives finished change-sets
///
/// Turning an applied group into a branch or pull request belongs to the
/// surrounding system; this trait is its seam.
pub trait ChangeApplier {
    /// Hand over one applied group and the files its updates touched
    fn apply(&self, outcome: &GroupOutcome) -> Result<(), AppError>;
}

/// Default applier that only announces the finished change-set
pub struct LogChangeApplier {
    quiet: bool,
}

impl LogChangeApplier {
    /// Creates a new logging applier
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ChangeApplier for LogChangeApplier {
    fn apply(&self, outcome: &GroupOutcome) -> Result<(), AppError> {
        if !self.quiet {
            println!(
                "{} {} ({} file(s) changed)",
                "change-set ready:".green(),
                outcome.label.as_deref().unwrap_or(&outcome.key),
                outcome.changed_files.len()
            );
        }
        Ok(())
    }
}

/// Orchestrator owning the run configuration and its collaborators
pub struct Orchestrator {
    args: CliArgs,
    fetcher: Box<dyn FileFetcher>,
    factory: Box<dyn CheckerFactory>,
    applier: Box<dyn ChangeApplier>,
}

impl Orchestrator {
    /// Creates an orchestrator with explicit collaborators
    pub fn new(
        args: CliArgs,
        fetcher: Box<dyn FileFetcher>,
        factory: Box<dyn CheckerFactory>,
        applier: Box<dyn ChangeApplier>,
    ) -> Self {
        Self {
            args,
            fetcher,
            factory,
            applier,
        }
    }

    /// Run the full pipeline and return its summary
    pub fn run(&self) -> Result<RunSummary, AppError> {
        let show_progress = !self.args.quiet && !self.args.json;
        let mut progress = Progress::new(show_progress);

        let mut fetched = self.fetcher.fetch()?;
        let resolver = ConstraintResolver::new(&fetched.files);
        let constraints = resolver.resolve()?.clone();

        let scratch = self.scratch_dir()?;
        let invoker = self.build_invoker()?;

        progress.spinner("Discovering dependencies...");
        let discovery_path = scratch.join("discovery.json");
        let mut discovery_cache = DiscoveryCache::new();
        let mut dependencies = discovery_cache.get_or_discover(&fetched, || {
            invoker.run_discover(&self.args.workspace, &discovery_path)?;
            let output = read_discovery_output(&discovery_path)?;
            Ok::<_, AppError>(dependencies_from_discovery(&output))
        })?;
        progress.finish_and_clear();

        constraints.annotate(&mut dependencies);
        dependencies.sort_by_key(|d| d.key());
        let declaring = declaring_projects(&dependencies);

        let mut classifier = EligibilityClassifier::new(self.args.ignore_list());
        if !show_progress {
            classifier = classifier.quiet();
        }

        let mut summary = RunSummary::new(&fetched.base_commit, self.args.dry_run);
        let mut candidates = Vec::new();

        progress.start(dependencies.len() as u64, "Checking dependencies");
        for dependency in &dependencies {
            progress.set_message(&dependency.name);
            match classifier.select(dependency, self.factory.as_ref()) {
                Selection::Candidate(candidate) => candidates.push(candidate),
                Selection::Skipped(skip) => summary.add_skip(skip),
            }
            progress.inc();
        }
        progress.finish_and_clear();

        let groups = group_candidates(candidates);
        let mut result_index = 0usize;

        for group in &groups {
            self.announce(group, show_progress);
            let mut outcome = GroupOutcome::pending(group);

            if !self.args.dry_run {
                for member in &group.members {
                    let projects = declaring
                        .get(&member.primary.name.to_lowercase())
                        .map(Vec::as_slice)
                        .unwrap_or(&[]);
                    for project in projects {
                        let job = UpdateJob {
                            project_path: project.clone(),
                            dependency_name: member.primary.name.clone(),
                            new_version: member.primary.version.clone(),
                            previous_version: member.primary.previous_version.clone(),
                            transitive: !member.primary.top_level,
                        };
                        let result_path = scratch.join(format!("result-{}.json", result_index));
                        result_index += 1;
                        invoker.run_update(&job, &result_path)?;
                    }
                }

                let refetched = self.fetcher.fetch()?;
                outcome.changed_files = changed_between(&fetched, &refetched);
                outcome.applied = true;
                fetched = refetched;

                self.applier.apply(&outcome)?;
            }

            summary.add_group(outcome);
        }

        Ok(summary)
    }

    fn announce(&self, group: &UpdateGroup, show: bool) {
        if !show {
            return;
        }
        match &group.name {
            Some(label) => println!("{} {}", "Updating group".bold(), label),
            None => println!("{}", "Updating".bold()),
        }
        for update in group.all_updates() {
            println!("  - Updating {}...", update);
        }
    }

    fn build_invoker(&self) -> Result<ToolInvoker, AppError> {
        let ecosystem = self.args.ecosystem()?;
        Ok(ToolInvoker::new(
            &self.args.tool_path,
            &self.args.path,
            self.args.credentials(),
            ecosystem.feed_credential_type(),
            self.args.credential_config_path(),
            self.args.verbose,
        ))
    }

    /// Per-process scratch directory for tool output and result files
    fn scratch_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = std::env::temp_dir().join(format!("batchup-{}", std::process::id()));
        std::fs::create_dir_all(&dir)
            .map_err(|e| ConfigError::invalid_path(&dir, e.to_string()))?;
        Ok(dir)
    }
}

/// Project files declaring each dependency, keyed by lowercase name
fn declaring_projects(dependencies: &[Dependency]) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for dependency in dependencies {
        let projects = map.entry(dependency.key()).or_default();
        for requirement in &dependency.requirements {
            if !projects.contains(&requirement.file) {
                projects.push(requirement.file.clone());
            }
        }
    }
    map
}

/// File names whose content differs between two fetches, sorted
fn changed_between(before: &FetchedFiles, after: &FetchedFiles) -> Vec<String> {
    let previous: HashMap<&str, &str> = before
        .files
        .iter()
        .map(|f| (f.name.as_str(), f.content.as_str()))
        .collect();

    let mut changed: Vec<String> = after
        .files
        .iter()
        .filter(|f| previous.get(f.name.as_str()) != Some(&f.content.as_str()))
        .map(|f| f.name.clone())
        .collect();
    changed.sort();
    changed
}
