//! External tool execution and result validation

use super::command::CommandSpec;
use crate::error::InvokerError;
use colored::Colorize;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// Structured result file the update tool writes
#[derive(Debug, Clone, Deserialize)]
pub struct ToolResultFile {
    /// Errors the tool reported; any entry fails the invocation
    #[serde(default)]
    pub errors: Vec<ToolReportedError>,
}

/// One error entry in the result file
#[derive(Debug, Clone, Deserialize)]
pub struct ToolReportedError {
    /// Machine-readable error code, when the tool provides one
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl ToolReportedError {
    fn describe(&self) -> String {
        match &self.code {
            Some(code) => format!("{}: {}", code, self.message),
            None => self.message.clone(),
        }
    }
}

/// Runs built commands and validates their outcomes
#[derive(Debug, Clone)]
pub struct ToolRunner {
    /// Whether captured tool output is echoed
    verbose: bool,
}

impl ToolRunner {
    /// Creates a new runner
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Execute a command, returning captured stdout
    ///
    /// The fingerprint, never the literal argument vector, is what gets
    /// logged. Diagnostics go to stderr so stdout stays machine-readable.
    /// A nonzero exit is fatal for the invocation.
    pub fn execute(&self, spec: &CommandSpec) -> Result<String, InvokerError> {
        eprintln!(
            "{}\n{}",
            "running updater tool:".cyan(),
            spec.fingerprint_line()
        );

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .envs(&spec.env)
            .output()
            .map_err(|e| InvokerError::spawn_failed(&spec.program, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if self.verbose && !stdout.is_empty() {
            eprintln!("{}", stdout);
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.is_empty() {
                eprintln!("{}", stderr);
            }
            return Err(InvokerError::tool_execution_failure(
                output.status.code().unwrap_or(-1),
                spec.fingerprint_line(),
            ));
        }

        Ok(stdout)
    }

    /// Validate the structured result file an update run wrote
    ///
    /// A missing file after a clean exit is accepted (not every tool version
    /// writes one); a present file must report zero errors.
    pub fn validate_result_file(&self, path: &Path) -> Result<(), InvokerError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(InvokerError::result_file_error(path, e.to_string())),
        };

        let result: ToolResultFile = serde_json::from_str(&content)
            .map_err(|e| InvokerError::result_file_error(path, e.to_string()))?;

        if result.errors.is_empty() {
            Ok(())
        } else {
            Err(InvokerError::structured_result_error(
                result.errors.len(),
                result.errors[0].describe(),
            ))
        }
    }
}
