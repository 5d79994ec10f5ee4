//! batchup - Batched dependency updater CLI tool
//!
//! Determines which dependencies of a repository can be upgraded, groups
//! related upgrades into change-sets, and drives an external ecosystem tool
//! to apply them.

use batchup::cli::CliArgs;
use batchup::eligibility::CatalogCheckerFactory;
use batchup::fetch::LocalFileFetcher;
use batchup::orchestrator::{LogChangeApplier, Orchestrator};
use batchup::output::{create_formatter, OutputConfig};
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    args.validate()?;

    if args.verbose {
        eprintln!("batchup v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", args.path.display());
        eprintln!("Ecosystem: {}", args.ecosystem()?);
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let catalog = args.load_version_catalog()?;
    let fetcher = LocalFileFetcher::new(&args.path);
    let factory = CatalogCheckerFactory::new(catalog);
    // In JSON mode stdout carries only the formatted summary.
    let applier = LogChangeApplier::new(args.quiet || args.json);

    let orchestrator = Orchestrator::new(
        args.clone(),
        Box::new(fetcher),
        Box::new(factory),
        Box::new(applier),
    );
    let summary = orchestrator.run()?;

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&summary, &mut stdout)?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
