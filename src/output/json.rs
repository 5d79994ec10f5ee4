//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of run results
//! - Structured group-by-group update/skip information

use crate::domain::{GroupOutcome, RunSummary, SkippedDependency};
use crate::output::{OutputFormatter, Verbosity};
use chrono::Utc;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput {
    /// When the report was generated (RFC 3339)
    generated_at: String,
    /// Base commit the dependency files were read at
    base_commit: String,
    /// Whether this was a dry-run
    dry_run: bool,
    /// Summary statistics
    summary: JsonSummaryCounts,
    /// Per-group results
    groups: Vec<JsonGroup>,
    /// Skipped dependencies (only in verbose mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<JsonSkip>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummaryCounts {
    /// Total number of individual updates
    updates: usize,
    /// Number of groups
    groups: usize,
    /// Number of groups the tool ran for
    applied_groups: usize,
    /// Total number of skips
    skips: usize,
}

/// JSON representation of one update group
#[derive(Serialize)]
struct JsonGroup {
    /// Grouping key
    key: String,
    /// Batch label, absent for singleton groups
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    /// Whether the external tool ran for this group
    applied: bool,
    /// Updates in the group
    updates: Vec<JsonUpdate>,
    /// Files the tool changed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    changed_files: Vec<String>,
}

/// JSON representation of an update
#[derive(Serialize)]
struct JsonUpdate {
    /// Package name
    name: String,
    /// Old version
    from: String,
    /// New version
    to: String,
    /// Whether the dependency is declared at the top level
    top_level: bool,
}

/// JSON representation of a skip
#[derive(Serialize)]
struct JsonSkip {
    /// Package name
    name: String,
    /// Current version, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    /// Skip reason
    reason: String,
}

impl JsonFormatter {
    fn group_to_json(outcome: &GroupOutcome) -> JsonGroup {
        JsonGroup {
            key: outcome.key.clone(),
            label: outcome.label.clone(),
            applied: outcome.applied,
            updates: outcome
                .updates
                .iter()
                .map(|u| JsonUpdate {
                    name: u.name.clone(),
                    from: u.previous_version.clone(),
                    to: u.version.clone(),
                    top_level: u.top_level,
                })
                .collect(),
            changed_files: outcome.changed_files.clone(),
        }
    }

    fn skip_to_json(skip: &SkippedDependency) -> JsonSkip {
        JsonSkip {
            name: skip.name.clone(),
            version: skip.version.clone(),
            reason: serde_json::to_value(&skip.reason)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| skip.reason.to_string()),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let skipped: Vec<JsonSkip> = if self.verbosity == Verbosity::Verbose {
            summary.skipped.iter().map(Self::skip_to_json).collect()
        } else {
            Vec::new()
        };

        let output = JsonOutput {
            generated_at: Utc::now().to_rfc3339(),
            base_commit: summary.base_commit.clone(),
            dry_run: summary.dry_run,
            summary: JsonSummaryCounts {
                updates: summary.total_updates(),
                groups: summary.groups.len(),
                applied_groups: summary.applied_groups(),
                skips: summary.skipped.len(),
            },
            groups: summary.groups.iter().map(Self::group_to_json).collect(),
            skipped,
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)?;

        Ok(())
    }
}
