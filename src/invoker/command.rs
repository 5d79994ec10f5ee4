//! External tool command construction
//!
//! Every command is built twice in parallel: the literal argument vector the
//! process runs with, and a fingerprint vector of identical shape where
//! variable values are replaced by fixed placeholders. Only the fingerprint
//! is ever logged; literal arguments may embed repository paths and package
//! identifiers that do not belong in telemetry.

use std::collections::BTreeMap;
use std::path::Path;

/// An external tool invocation: literal arguments, loggable fingerprint, env
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute
    pub program: String,
    /// Literal argument vector
    pub args: Vec<String>,
    /// Same shape as `args`, variable values replaced by placeholders
    pub fingerprint: Vec<String>,
    /// Additional environment for the child process
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Creates an empty command for the given program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            fingerprint: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Push a fixed argument (appears verbatim in the fingerprint)
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.fingerprint.push(value.clone());
        self.args.push(value);
        self
    }

    /// Push a variable argument, redacted to a placeholder in the fingerprint
    pub fn arg_redacted(mut self, value: impl Into<String>, placeholder: &str) -> Self {
        self.args.push(value.into());
        self.fingerprint.push(placeholder.to_string());
        self
    }

    /// Set an environment variable for the child process
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The loggable rendering of this command
    pub fn fingerprint_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.fingerprint.iter().cloned());
        parts.join(" ")
    }
}

/// One requested dependency update for the external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateJob {
    /// Project or solution file the update applies to (repo-relative)
    pub project_path: String,
    /// Dependency to update
    pub dependency_name: String,
    /// Target version
    pub new_version: String,
    /// Version before the update
    pub previous_version: String,
    /// Whether the dependency is transitive in this project
    pub transitive: bool,
}

/// Build the `update` invocation
pub fn update_command(
    tool_path: &Path,
    repo_root: &Path,
    job: &UpdateJob,
    result_path: &Path,
) -> CommandSpec {
    let mut spec = CommandSpec::new(tool_path.to_string_lossy())
        .arg("update")
        .arg("--repo-root")
        .arg_redacted(repo_root.to_string_lossy(), "<repo-root>")
        .arg("--solution-or-project")
        .arg_redacted(&job.project_path, "<path-to-solution-or-project>")
        .arg("--dependency")
        .arg_redacted(&job.dependency_name, "<dependency-name>")
        .arg("--new-version")
        .arg_redacted(&job.new_version, "<new-version>")
        .arg("--previous-version")
        .arg_redacted(&job.previous_version, "<previous-version>");

    if job.transitive {
        spec = spec.arg("--transitive");
    }

    spec.arg("--result-output-path")
        .arg_redacted(result_path.to_string_lossy(), "<result-output-path>")
        .arg("--verbose")
}

/// Build the `discover` invocation
pub fn discover_command(
    tool_path: &Path,
    repo_root: &Path,
    workspace: &str,
    output_path: &Path,
) -> CommandSpec {
    CommandSpec::new(tool_path.to_string_lossy())
        .arg("discover")
        .arg("--repo-root")
        .arg_redacted(repo_root.to_string_lossy(), "<repo-root>")
        .arg("--workspace")
        .arg_redacted(workspace, "<workspace-path>")
        .arg("--output")
        .arg_redacted(output_path.to_string_lossy(), "<output-path>")
        .arg("--verbose")
}
