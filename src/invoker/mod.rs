//! Secure invocation of the external update/discovery tool
//!
//! This module provides:
//! - Command construction with a redacted logging fingerprint
//! - The feed credential bundle passed through the environment
//! - Scoped patching of the shared credential configuration
//! - Process execution and structured result validation

mod command;
mod config_guard;
mod feed;
mod runner;

pub use command::{discover_command, update_command, CommandSpec, UpdateJob};
pub use config_guard::CredentialConfigGuard;
pub use feed::{feed_credentials_json, FEED_ENDPOINTS_ENV};
pub use runner::{ToolReportedError, ToolResultFile, ToolRunner};

use crate::domain::Credential;
use crate::error::InvokerError;
use std::path::{Path, PathBuf};

/// Drives the external tool with scoped credentials
///
/// Every invocation goes through the same discipline: build the command and
/// its fingerprint, inject feed credentials into the child environment,
/// patch the shared credential configuration, run, validate, restore. The
/// restore step runs on every exit path via the guard's Drop.
pub struct ToolInvoker {
    tool_path: PathBuf,
    repo_root: PathBuf,
    credentials: Vec<Credential>,
    feed_type: &'static str,
    config_path: PathBuf,
    runner: ToolRunner,
}

impl ToolInvoker {
    /// Creates a new invoker
    pub fn new(
        tool_path: impl Into<PathBuf>,
        repo_root: impl Into<PathBuf>,
        credentials: Vec<Credential>,
        feed_type: &'static str,
        config_path: impl Into<PathBuf>,
        verbose: bool,
    ) -> Self {
        Self {
            tool_path: tool_path.into(),
            repo_root: repo_root.into(),
            credentials,
            feed_type,
            config_path: config_path.into(),
            runner: ToolRunner::new(verbose),
        }
    }

    /// Run one dependency update and validate its result file
    pub fn run_update(&self, job: &UpdateJob, result_path: &Path) -> Result<(), InvokerError> {
        let spec = self.with_feed_env(update_command(
            &self.tool_path,
            &self.repo_root,
            job,
            result_path,
        ));

        let _guard = CredentialConfigGuard::acquire(&self.config_path, &self.credentials)?;
        self.runner.execute(&spec)?;
        self.runner.validate_result_file(result_path)
    }

    /// Run dependency discovery, writing its output file
    ///
    /// The caller owns reading the output; discovery without an output file
    /// is an error at that boundary, not here.
    pub fn run_discover(&self, workspace: &str, output_path: &Path) -> Result<(), InvokerError> {
        let spec = self.with_feed_env(discover_command(
            &self.tool_path,
            &self.repo_root,
            workspace,
            output_path,
        ));

        let _guard = CredentialConfigGuard::acquire(&self.config_path, &self.credentials)?;
        self.runner.execute(&spec)?;
        Ok(())
    }

    fn with_feed_env(&self, spec: CommandSpec) -> CommandSpec {
        match feed_credentials_json(&self.credentials, self.feed_type) {
            Some(json) => spec.env(FEED_ENDPOINTS_ENV, json),
            None => spec,
        }
    }
}
