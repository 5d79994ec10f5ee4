//! Integration tests for batchup
//!
//! These tests verify:
//! - Ceiling resolution over realistic dependency file sets
//! - Grouping of related update candidates
//! - The full pipeline against a stub updater tool
//! - Credential handling around tool invocations

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

mod ceiling_resolution {
    use super::*;
    use batchup::constraint::ConstraintResolver;
    use batchup::fetch::{FileFetcher, LocalFileFetcher};

    #[test]
    fn test_ceilings_resolved_from_fetched_repository() {
        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("Directory.Packages.props"),
            r#"<Project>
  <PropertyGroup>
    <SentryCeiling>3.0.0</SentryCeiling>
  </PropertyGroup>
  <ItemGroup>
    <PackageVersion Include="Sentry" Version="2.9.0" MaxVersion="$(SentryCeiling)" />
    <PackageVersion Include="Dapper" Version="2.0.0" />
  </ItemGroup>
</Project>"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("App.csproj"),
            r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#,
        )
        .unwrap();

        let fetched = LocalFileFetcher::new(temp_dir.path()).fetch().unwrap();
        let resolver = ConstraintResolver::new(&fetched.files);
        let map = resolver.resolve().unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.ceiling("sentry").unwrap().original(), "3.0.0");
        assert!(map.ceiling("Dapper").is_none());
    }

    #[test]
    fn test_chained_properties_across_files() {
        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("Common.props"),
            r#"<Project>
  <PropertyGroup>
    <BaseCeiling>4.2.0</BaseCeiling>
    <SerilogCeiling>$(BaseCeiling)</SerilogCeiling>
  </PropertyGroup>
</Project>"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("Directory.Packages.props"),
            r#"<Project>
  <ItemGroup>
    <PackageVersion Include="Serilog" MaxVersion="$(SerilogCeiling)" />
  </ItemGroup>
</Project>"#,
        )
        .unwrap();

        let fetched = LocalFileFetcher::new(temp_dir.path()).fetch().unwrap();
        let map = ConstraintResolver::new(&fetched.files)
            .resolve()
            .unwrap()
            .clone();
        assert_eq!(map.ceiling("serilog").unwrap().original(), "4.2.0");
    }
}

mod grouping {
    use batchup::domain::{DependencyUpdate, UnlockScope, UpdateCandidate};
    use batchup::grouping::group_candidates;

    fn candidate(name: &str, new: &str, previous: &str) -> UpdateCandidate {
        let primary = DependencyUpdate::new(name, new, previous);
        UpdateCandidate::new(primary.clone(), vec![primary], UnlockScope::Own)
    }

    #[test]
    fn test_related_packages_batched_under_common_label() {
        let groups = group_candidates(vec![
            candidate("Sentry.Protocol", "3.0.0", "2.9.0"),
            candidate("Sentry", "3.0.0", "2.9.0"),
            candidate("Dapper", "2.1.0", "2.0.0"),
        ]);

        assert_eq!(groups.len(), 2);
        let sentry = groups
            .iter()
            .find(|g| g.key == "Sentry/3.0.0/2.9.0")
            .unwrap();
        assert!(sentry.is_batched());
        assert_eq!(sentry.name.as_deref(), Some("Sentry/3.0.0/2.9.0"));

        let dapper = groups
            .iter()
            .find(|g| g.key == "Dapper/2.1.0/2.0.0")
            .unwrap();
        assert!(!dapper.is_batched());
        assert!(dapper.name.is_none());
    }

    #[test]
    fn test_same_prefix_different_versions_not_batched() {
        let groups = group_candidates(vec![
            candidate("Sentry", "3.0.0", "2.9.0"),
            candidate("Sentry.Protocol", "3.1.0", "2.9.0"),
        ]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_grouping_is_deterministic_across_input_orders() {
        let forward = group_candidates(vec![
            candidate("Sentry", "3.0.0", "2.9.0"),
            candidate("Sentry.Protocol", "3.0.0", "2.9.0"),
            candidate("Dapper", "2.1.0", "2.0.0"),
        ]);
        let reversed = group_candidates(vec![
            candidate("Dapper", "2.1.0", "2.0.0"),
            candidate("Sentry.Protocol", "3.0.0", "2.9.0"),
            candidate("Sentry", "3.0.0", "2.9.0"),
        ]);

        let keys = |groups: &[batchup::domain::UpdateGroup]| {
            groups.iter().map(|g| g.key.clone()).collect::<Vec<_>>()
        };
        assert_eq!(keys(&forward), keys(&reversed));
    }
}

/// Write the stub updater tool script used by pipeline tests
///
/// The stub logs every verb it receives, serves a canned discovery file, and
/// edits the project file on update so changed-file detection has something
/// to see.
#[cfg(unix)]
fn write_stub_tool(dir: &Path, discovery_fixture: &Path, log: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let tool = dir.join("stub-updater");
    let script = format!(
        r#"#!/bin/sh
verb="$1"
root=""
out=""
prev=""
for a in "$@"; do
  case "$prev" in
    --repo-root) root="$a" ;;
    --output) out="$a" ;;
  esac
  prev="$a"
done
echo "$verb" >> "{log}"
if [ -n "$VSS_NUGET_EXTERNAL_FEED_ENDPOINTS" ]; then
  echo "$VSS_NUGET_EXTERNAL_FEED_ENDPOINTS" > "{log}.env"
fi
if [ "$verb" = "discover" ]; then
  cp "{fixture}" "$out"
else
  printf '<!-- updated -->\n' >> "$root/App.csproj"
fi
exit 0
"#,
        log = log.display(),
        fixture = discovery_fixture.display(),
    );
    fs::write(&tool, script).unwrap();
    let mut perms = fs::metadata(&tool).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&tool, perms).unwrap();
    tool
}

#[cfg(unix)]
mod pipeline {
    use super::*;
    use batchup::cli::CliArgs;
    use batchup::eligibility::CatalogCheckerFactory;
    use batchup::fetch::LocalFileFetcher;
    use batchup::orchestrator::{LogChangeApplier, Orchestrator};
    use clap::Parser;

    struct Fixture {
        repo: TempDir,
        scratch: TempDir,
        tool: std::path::PathBuf,
        log: std::path::PathBuf,
        catalog: std::path::PathBuf,
        config: std::path::PathBuf,
    }

    fn fixture() -> Fixture {
        let repo = create_test_dir();
        let scratch = create_test_dir();

        fs::write(
            repo.path().join("App.csproj"),
            r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#,
        )
        .unwrap();
        fs::write(
            repo.path().join("Directory.Packages.props"),
            r#"<Project>
  <ItemGroup>
    <PackageVersion Include="Capped" Version="1.0.0" MaxVersion="1.6.0" />
  </ItemGroup>
</Project>"#,
        )
        .unwrap();

        let discovery = scratch.path().join("discovery-fixture.json");
        fs::write(
            &discovery,
            r#"{
  "projects": [
    {
      "path": "App.csproj",
      "dependencies": [
        {"name": "Sentry", "version": "2.9.0"},
        {"name": "Sentry.Protocol", "version": "2.9.0"},
        {"name": "Capped", "version": "1.0.0"},
        {"name": "Settled", "version": "1.0.0"}
      ]
    }
  ]
}"#,
        )
        .unwrap();

        let catalog = scratch.path().join("catalog.json");
        fs::write(
            &catalog,
            r#"{
  "Sentry": ["3.0.0"],
  "Sentry.Protocol": ["3.0.0"],
  "Capped": ["1.5.0", "2.0.0"],
  "Settled": ["1.0.0"]
}"#,
        )
        .unwrap();

        let config = scratch.path().join("NuGet.Config");
        fs::write(&config, "<configuration>prior</configuration>").unwrap();

        let log = scratch.path().join("invocations.log");
        let tool = write_stub_tool(scratch.path(), &discovery, &log);

        Fixture {
            repo,
            scratch,
            tool,
            log,
            catalog,
            config,
        }
    }

    fn orchestrator(fx: &Fixture, extra: &[&str]) -> Orchestrator {
        let mut argv = vec![
            "batchup".to_string(),
            fx.repo.path().display().to_string(),
            "--tool-path".to_string(),
            fx.tool.display().to_string(),
            "--credential-config".to_string(),
            fx.config.display().to_string(),
            "--version-catalog".to_string(),
            fx.catalog.display().to_string(),
            "--quiet".to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        let args = CliArgs::parse_from(argv);

        let catalog = args.load_version_catalog().unwrap();
        Orchestrator::new(
            args.clone(),
            Box::new(LocalFileFetcher::new(&args.path)),
            Box::new(CatalogCheckerFactory::new(catalog)),
            Box::new(LogChangeApplier::new(true)),
        )
    }

    #[test]
    fn test_full_run_groups_and_applies_updates() {
        let fx = fixture();
        let summary = orchestrator(&fx, &[]).run().unwrap();

        assert_eq!(summary.groups.len(), 2);
        assert_eq!(summary.total_updates(), 3);
        assert_eq!(summary.applied_groups(), 2);

        let sentry = summary
            .groups
            .iter()
            .find(|g| g.key == "Sentry/3.0.0/2.9.0")
            .unwrap();
        assert_eq!(sentry.label.as_deref(), Some("Sentry/3.0.0/2.9.0"));
        assert_eq!(sentry.updates.len(), 2);
        assert_eq!(sentry.changed_files, vec!["App.csproj"]);

        // Ceiling 1.6.0 keeps Capped off 2.0.0
        let capped = summary
            .groups
            .iter()
            .find(|g| g.key == "Capped/1.5.0/1.0.0")
            .unwrap();
        assert_eq!(capped.updates[0].version, "1.5.0");

        // Up-to-date dependency never reaches grouping
        assert!(summary.skipped.iter().any(|s| s.name == "Settled"));

        // One discover plus one update per (project, primary)
        let log = fs::read_to_string(&fx.log).unwrap();
        let verbs: Vec<&str> = log.lines().collect();
        assert_eq!(verbs.iter().filter(|v| **v == "discover").count(), 1);
        assert_eq!(verbs.iter().filter(|v| **v == "update").count(), 3);
    }

    #[test]
    fn test_dry_run_stops_before_update_invocations() {
        let fx = fixture();
        let summary = orchestrator(&fx, &["--dry-run"]).run().unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.groups.len(), 2);
        assert_eq!(summary.applied_groups(), 0);
        assert!(summary.groups.iter().all(|g| g.changed_files.is_empty()));

        let log = fs::read_to_string(&fx.log).unwrap();
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["discover"]);
    }

    #[test]
    fn test_ignore_list_skips_named_dependency_only() {
        let fx = fixture();
        let summary = orchestrator(&fx, &["--dry-run", "--ignore", "Sentry"]).run().unwrap();

        assert!(summary.skipped.iter().any(|s| s.name == "Sentry"));
        // The exact-match list must not catch the longer sibling name
        assert!(summary
            .groups
            .iter()
            .flat_map(|g| &g.updates)
            .any(|u| u.name == "Sentry.Protocol"));
    }

    #[test]
    fn test_credential_config_restored_and_feed_env_passed() {
        let fx = fixture();
        let summary = orchestrator(
            &fx,
            &[
                "--nuget-feed",
                "https://feed.example/v3/index.json",
                "--nuget-access-token",
                "user:s3cret",
            ],
        )
        .run()
        .unwrap();
        assert_eq!(summary.applied_groups(), 2);

        // The patched configuration never survives the run
        assert_eq!(
            fs::read_to_string(&fx.config).unwrap(),
            "<configuration>prior</configuration>"
        );

        // The child process saw the credential bundle
        let env_dump =
            fs::read_to_string(format!("{}.env", fx.log.display())).unwrap();
        assert!(env_dump.contains("endpointCredentials"));
        assert!(env_dump.contains("s3cret"));
    }

    #[test]
    fn test_tool_failure_is_fatal() {
        let fx = fixture();
        fs::write(&fx.tool, "#!/bin/sh\nexit 3\n").unwrap();
        let err = orchestrator(&fx, &[]).run().unwrap_err();
        assert!(format!("{}", err).contains("exit code 3"));
    }
}

#[cfg(unix)]
mod binary {
    use super::*;
    use assert_cmd::Command;
    use predicates::prelude::*;

    #[test]
    fn test_missing_repository_root_fails() {
        Command::cargo_bin("batchup")
            .unwrap()
            .arg("/definitely/not/a/repo")
            .assert()
            .failure()
            .stderr(predicate::str::contains("repository root not found"));
    }

    #[test]
    fn test_conflicting_verbosity_flags_rejected() {
        Command::cargo_bin("batchup")
            .unwrap()
            .args(["--quiet", "--verbose", "."])
            .assert()
            .failure()
            .stderr(predicate::str::contains("conflicting options"));
    }

    #[test]
    fn test_unsupported_package_manager_rejected() {
        let temp_dir = create_test_dir();
        Command::cargo_bin("batchup")
            .unwrap()
            .args(["--package-manager", "cargo"])
            .arg(temp_dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("unsupported package manager"));
    }

    #[test]
    fn test_secrets_never_logged() {
        let repo = create_test_dir();
        let scratch = create_test_dir();
        fs::write(repo.path().join("App.csproj"), "<Project/>").unwrap();

        let discovery = scratch.path().join("discovery.json");
        fs::write(&discovery, r#"{"projects": []}"#).unwrap();
        let log = scratch.path().join("invocations.log");
        let tool = write_stub_tool(scratch.path(), &discovery, &log);
        let config = scratch.path().join("NuGet.Config");

        Command::cargo_bin("batchup")
            .unwrap()
            .arg(repo.path())
            .args(["--tool-path", &tool.display().to_string()])
            .args(["--credential-config", &config.display().to_string()])
            .args(["--nuget-feed", "https://feed.example/v3/index.json"])
            .args(["--nuget-access-token", "user:hunter2"])
            .args(["--verbose"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hunter2").not())
            .stderr(predicate::str::contains("hunter2").not())
            .stderr(predicate::str::contains("<repo-root>"));
    }
}
