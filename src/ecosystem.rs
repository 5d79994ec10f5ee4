//! Ecosystem type definitions for supported package managers

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported package ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// .NET ecosystem (NuGet)
    Nuget,
}

impl Ecosystem {
    /// Parses a package manager name as given on the command line
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.to_lowercase().as_str() {
            "nuget" => Ok(Ecosystem::Nuget),
            other => Err(ConfigError::unsupported_package_manager(other)),
        }
    }

    /// Returns the credential type tag private feeds use for this ecosystem
    pub fn feed_credential_type(&self) -> &'static str {
        match self {
            Ecosystem::Nuget => "nuget_feed",
        }
    }

    /// Returns the display name for this ecosystem
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Nuget => "NuGet",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
