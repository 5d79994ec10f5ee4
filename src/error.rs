//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConstraintError: Issues with version-ceiling file parsing
//! - FetchError: Issues with dependency file collection and discovery
//! - InvokerError: Issues with the external updater tool
//! - ConfigError: Issues with run configuration

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Version-ceiling file related errors
    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    /// Dependency file collection related errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// External tool invocation related errors
    #[error(transparent)]
    Invoker(#[from] InvokerError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to version-ceiling declaration files
#[derive(Error, Debug)]
pub enum ConstraintError {
    /// XML in a ceiling file could not be read
    #[error("failed to parse XML in {path}: {message}")]
    XmlParseError { path: PathBuf, message: String },

    /// A declared ceiling value is not a parseable version
    #[error("invalid ceiling version '{value}' for '{name}' in {path}")]
    InvalidCeiling {
        path: PathBuf,
        name: String,
        value: String,
    },
}

/// Errors related to dependency file collection and discovery
#[derive(Error, Debug)]
pub enum FetchError {
    /// Repository root does not exist
    #[error("repository root not found: {path}")]
    RootNotFound { path: PathBuf },

    /// Failed to read a dependency file
    #[error("failed to read dependency file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Discovery output file missing after a discovery run
    #[error("discovery output not found at {path}")]
    DiscoveryOutputMissing { path: PathBuf },

    /// Discovery output file could not be deserialized
    #[error("failed to parse discovery output {path}: {message}")]
    DiscoveryParseError { path: PathBuf, message: String },
}

/// Errors related to the external updater tool
#[derive(Error, Debug)]
pub enum InvokerError {
    /// The tool process could not be spawned
    #[error("failed to launch updater tool '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool exited with a nonzero status
    #[error("updater tool failed with exit code {code}: {fingerprint}")]
    ToolExecutionFailure { code: i32, fingerprint: String },

    /// The structured result file reported one or more errors
    #[error("updater tool reported {count} error(s): {first}")]
    StructuredResultError { count: usize, first: String },

    /// The structured result file could not be read back
    #[error("failed to read tool result file {path}: {message}")]
    ResultFileError { path: PathBuf, message: String },

    /// The scoped credential configuration could not be written
    #[error("failed to patch credential configuration {path}: {source}")]
    ConfigPatchFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown package manager name
    #[error("unsupported package manager '{name}': expected one of {supported}")]
    UnsupportedPackageManager { name: String, supported: String },

    /// Invalid path supplied on the command line or environment
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}

impl ConstraintError {
    /// Creates a new XmlParseError
    pub fn xml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConstraintError::XmlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidCeiling error
    pub fn invalid_ceiling(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        ConstraintError::InvalidCeiling {
            path: path.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

impl FetchError {
    /// Creates a new RootNotFound error
    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        FetchError::RootNotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new DiscoveryParseError
    pub fn discovery_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FetchError::DiscoveryParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl InvokerError {
    /// Creates a new SpawnFailed error
    pub fn spawn_failed(program: impl Into<String>, source: std::io::Error) -> Self {
        InvokerError::SpawnFailed {
            program: program.into(),
            source,
        }
    }

    /// Creates a new ToolExecutionFailure error
    pub fn tool_execution_failure(code: i32, fingerprint: impl Into<String>) -> Self {
        InvokerError::ToolExecutionFailure {
            code,
            fingerprint: fingerprint.into(),
        }
    }

    /// Creates a new StructuredResultError
    pub fn structured_result_error(count: usize, first: impl Into<String>) -> Self {
        InvokerError::StructuredResultError {
            count,
            first: first.into(),
        }
    }

    /// Creates a new ResultFileError
    pub fn result_file_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        InvokerError::ResultFileError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new UnsupportedPackageManager error
    pub fn unsupported_package_manager(name: impl Into<String>) -> Self {
        ConfigError::UnsupportedPackageManager {
            name: name.into(),
            supported: "nuget".to_string(),
        }
    }

    /// Creates a new InvalidPath error
    pub fn invalid_path(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new ConflictingOptions error
    pub fn conflicting_options(message: impl Into<String>) -> Self {
        ConfigError::ConflictingOptions {
            message: message.into(),
        }
    }
}
