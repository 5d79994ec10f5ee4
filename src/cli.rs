//! CLI argument parsing module for batchup

use crate::domain::{dedup_credentials, Credential, RepositoryDedup};
use crate::ecosystem::Ecosystem;
use crate::eligibility::VersionCatalog;
use crate::error::ConfigError;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Batched dependency updater driving an external ecosystem tool
#[derive(Parser, Debug, Clone)]
#[command(name = "batchup", version, about = "Batched dependency updater")]
pub struct CliArgs {
    /// Repository root (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Package ecosystem to update
    #[arg(long, env = "PACKAGE_MANAGER", default_value = "nuget")]
    pub package_manager: String,

    /// Workspace directory within the repository, as seen by the tool
    #[arg(long, default_value = "/")]
    pub workspace: String,

    /// Path to the external updater tool binary
    #[arg(long, env = "UPDATER_TOOL_PATH", default_value = "dotnet-dependency-updater")]
    pub tool_path: PathBuf,

    /// JSON file mapping package names to their known available versions
    #[arg(long, env = "VERSION_CATALOG")]
    pub version_catalog: Option<PathBuf>,

    // Package filters
    /// Skip specific packages (comma separated, can be specified multiple times)
    #[arg(long = "ignore", env = "IGNORE_DEPENDENCY", value_delimiter = ',', action = ArgAction::Append)]
    pub ignored: Vec<String>,

    // Credentials
    /// Source-control host the access token applies to
    #[arg(long, env = "GIT_HOST", default_value = "github.com")]
    pub git_host: String,

    /// Source-control access token
    #[arg(long, env = "GIT_ACCESS_TOKEN", hide_env_values = true)]
    pub git_access_token: Option<String>,

    /// Private feed URL
    #[arg(long, env = "NUGET_FEED")]
    pub nuget_feed: Option<String>,

    /// Private feed token in `user:secret` form
    #[arg(long, env = "NUGET_ACCESS_TOKEN", hide_env_values = true)]
    pub nuget_access_token: Option<String>,

    /// Second private feed URL
    #[arg(long, env = "ALTERNATIVE_NUGET_FEED")]
    pub alternative_nuget_feed: Option<String>,

    /// Second private feed token in `user:secret` form
    #[arg(long, env = "ALTERNATIVE_NUGET_ACCESS_TOKEN", hide_env_values = true)]
    pub alternative_nuget_access_token: Option<String>,

    /// Credential configuration file patched around tool runs
    /// (default: $HOME/.nuget/NuGet/NuGet.Config)
    #[arg(long)]
    pub credential_config: Option<PathBuf>,

    /// When the same feed URL appears twice, keep the first entry instead of
    /// preferring the authenticated one
    #[arg(long)]
    pub keep_first_feed: bool,

    // General options
    /// Dry run mode - show what would be updated without invoking the tool
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Validate option combinations
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quiet && self.verbose {
            return Err(ConfigError::conflicting_options(
                "--quiet and --verbose cannot be combined",
            ));
        }
        Ok(())
    }

    /// The parsed ecosystem
    pub fn ecosystem(&self) -> Result<Ecosystem, ConfigError> {
        Ecosystem::parse(&self.package_manager)
    }

    /// The feed dedup policy in effect
    pub fn dedup_policy(&self) -> RepositoryDedup {
        if self.keep_first_feed {
            RepositoryDedup::KeepFirst
        } else {
            RepositoryDedup::PreferAuthenticated
        }
    }

    /// The credential configuration path, defaulting to the user-level one
    pub fn credential_config_path(&self) -> PathBuf {
        match &self.credential_config {
            Some(path) => path.clone(),
            None => {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home)
                    .join(".nuget")
                    .join("NuGet")
                    .join("NuGet.Config")
            }
        }
    }

    /// Assemble the run's credential set from the provided options
    ///
    /// A feed URL without a token still yields an entry so the tool can reach
    /// the feed anonymously; a token without a URL yields nothing.
    pub fn credentials(&self) -> Vec<Credential> {
        let mut credentials = Vec::new();

        if let Some(token) = &self.git_access_token {
            credentials.push(Credential::GitSource {
                host: self.git_host.clone(),
                username: "x-access-token".to_string(),
                password: token.clone(),
            });
        }

        for (feed, token) in [
            (&self.nuget_feed, &self.nuget_access_token),
            (
                &self.alternative_nuget_feed,
                &self.alternative_nuget_access_token,
            ),
        ] {
            if let Some(url) = feed {
                credentials.push(Credential::NugetFeed {
                    url: url.clone(),
                    token: token.clone(),
                });
            }
        }

        dedup_credentials(&credentials, self.dedup_policy())
    }

    /// Load the version catalog, empty when none was supplied
    pub fn load_version_catalog(&self) -> Result<VersionCatalog, ConfigError> {
        match &self.version_catalog {
            Some(path) => VersionCatalog::load(path),
            None => Ok(VersionCatalog::new()),
        }
    }

    /// The normalized ignore list
    pub fn ignore_list(&self) -> Vec<String> {
        self.ignored
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}
