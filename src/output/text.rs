//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-group update display with batch labels
//! - Skipped package display with reasons
//! - Summary with applied/pending breakdown

use crate::domain::{GroupOutcome, RunSummary, SkippedDependency};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn group_heading(&self, outcome: &GroupOutcome) -> String {
        let title = match &outcome.label {
            Some(label) => label.clone(),
            None => outcome
                .updates
                .first()
                .map(|u| u.name.clone())
                .unwrap_or_else(|| outcome.key.clone()),
        };
        let status = if outcome.applied {
            "updated"
        } else {
            "pending"
        };

        if self.color {
            format!("{} {}", title.bold(), format!("({})", status).dimmed())
        } else {
            format!("{} ({})", title, status)
        }
    }

    fn format_group(
        &self,
        outcome: &GroupOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "{}", self.group_heading(outcome))?;

        for update in &outcome.updates {
            if self.color {
                writeln!(
                    writer,
                    "  {} {} {} {}",
                    update.name,
                    update.previous_version.dimmed(),
                    "→".dimmed(),
                    update.version.bright_white().bold()
                )?;
            } else {
                writeln!(
                    writer,
                    "  {} {} -> {}",
                    update.name, update.previous_version, update.version
                )?;
            }
        }

        if self.verbosity == Verbosity::Verbose && !outcome.changed_files.is_empty() {
            for file in &outcome.changed_files {
                if self.color {
                    writeln!(writer, "    {}", file.dimmed())?;
                } else {
                    writeln!(writer, "    {}", file)?;
                }
            }
        }

        writeln!(writer)
    }

    fn format_skip(
        &self,
        skip: &SkippedDependency,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let version = skip
            .version
            .as_deref()
            .map(|v| format!(" {}", v))
            .unwrap_or_default();

        if self.color {
            writeln!(
                writer,
                "  {}{} {}",
                format!("{:width$}", skip.name, width = max_name_len).dimmed(),
                version.dimmed(),
                format!("({})", skip.reason).dimmed()
            )
        } else {
            writeln!(
                writer,
                "  {:width$}{} ({})",
                skip.name,
                version,
                skip.reason,
                width = max_name_len
            )
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = if summary.dry_run {
            if self.color {
                format!("{} ", "(dry-run)".cyan())
            } else {
                "(dry-run) ".to_string()
            }
        } else {
            String::new()
        };

        if self.verbosity != Verbosity::Quiet {
            for outcome in &summary.groups {
                self.format_group(outcome, writer)?;
            }

            if self.verbosity == Verbosity::Verbose && !summary.skipped.is_empty() {
                if self.color {
                    writeln!(writer, "{}", "Skipped:".dimmed())?;
                } else {
                    writeln!(writer, "Skipped:")?;
                }
                let max_name_len = summary
                    .skipped
                    .iter()
                    .map(|s| s.name.len())
                    .max()
                    .unwrap_or(0)
                    .max(20);
                for skip in &summary.skipped {
                    self.format_skip(skip, max_name_len, writer)?;
                }
                writeln!(writer)?;
            }
        }

        let updates = summary.total_updates();
        if self.verbosity == Verbosity::Quiet {
            if updates > 0 {
                writeln!(writer, "{}{} updated", prefix, updates)?;
            } else {
                writeln!(writer, "{}No updates", prefix)?;
            }
            return Ok(());
        }

        if self.color {
            writeln!(writer, "{}{}:", prefix, "Summary".bold())?;
        } else {
            writeln!(writer, "{}Summary:", prefix)?;
        }
        if updates > 0 {
            writeln!(
                writer,
                "  {} update(s) in {} group(s), {} group(s) applied",
                updates,
                summary.groups.len(),
                summary.applied_groups()
            )?;
        } else {
            writeln!(writer, "  No updates")?;
        }
        writeln!(writer, "  {} package(s) skipped", summary.skipped.len())?;
        if self.verbosity == Verbosity::Verbose {
            writeln!(writer, "  base commit: {}", summary.base_commit)?;
        }

        Ok(())
    }
}
