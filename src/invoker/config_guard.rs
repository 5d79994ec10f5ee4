//! Scoped credential configuration patching
//!
//! The external tool reads feed credentials from the user-level NuGet
//! configuration file, which is shared, process-wide state. The guard
//! snapshots whatever is there, writes the run's effective configuration,
//! and restores the snapshot when dropped. Restoration runs on every exit
//! path; a restore failure is logged but never masks an error already in
//! flight.
//!
//! Concurrent runs against the same configuration location are not
//! supported; callers must serialize externally.

use crate::domain::Credential;
use crate::error::InvokerError;
use std::fs;
use std::path::{Path, PathBuf};

/// RAII handle over the patched credential configuration
#[derive(Debug)]
pub struct CredentialConfigGuard {
    path: PathBuf,
    /// File content before patching; None when the file did not exist
    prior: Option<String>,
    restored: bool,
}

impl CredentialConfigGuard {
    /// Snapshot the current configuration and write the patched one
    pub fn acquire(path: &Path, credentials: &[Credential]) -> Result<Self, InvokerError> {
        let prior = match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(InvokerError::ConfigPatchFailed {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| InvokerError::ConfigPatchFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, render_config(credentials)).map_err(|e| {
            InvokerError::ConfigPatchFailed {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            prior,
            restored: false,
        })
    }

    /// Restore the snapshot and report the outcome
    ///
    /// Dropping the guard restores too; this explicit form is for callers
    /// that want the restore result.
    pub fn restore(mut self) -> std::io::Result<()> {
        self.restore_inner()
    }

    fn restore_inner(&mut self) -> std::io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        match &self.prior {
            Some(content) => fs::write(&self.path, content),
            None => match fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
        }
    }
}

impl Drop for CredentialConfigGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore_inner() {
            // Best effort: surface the problem without panicking in a drop
            // path that may already be unwinding from the real failure.
            eprintln!(
                "warning: failed to restore credential configuration {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Render the effective NuGet configuration for this run's credentials
fn render_config(credentials: &[Credential]) -> String {
    let mut sources = String::new();
    let mut source_credentials = String::new();

    for (index, cred) in credentials.iter().enumerate() {
        let Credential::NugetFeed { url, token } = cred else {
            continue;
        };
        let key = format!("feed{}", index);
        sources.push_str(&format!(
            "    <add key=\"{}\" value=\"{}\" />\n",
            key,
            xml_escape(url)
        ));

        if let Some((username, password)) = token.as_deref().and_then(|t| t.split_once(':')) {
            source_credentials.push_str(&format!(
                "    <{key}>\n      <add key=\"Username\" value=\"{}\" />\n      <add key=\"ClearTextPassword\" value=\"{}\" />\n    </{key}>\n",
                xml_escape(username),
                xml_escape(password),
            ));
        }
    }

    let mut config = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<configuration>\n  <packageSources>\n    <clear />\n    <add key=\"nuget.org\" value=\"https://api.nuget.org/v3/index.json\" />\n",
    );
    config.push_str(&sources);
    config.push_str("  </packageSources>\n");
    if !source_credentials.is_empty() {
        config.push_str("  <packageSourceCredentials>\n");
        config.push_str(&source_credentials);
        config.push_str("  </packageSourceCredentials>\n");
    }
    config.push_str("</configuration>\n");
    config
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
