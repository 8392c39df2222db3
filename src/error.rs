//! Error types for the launcher
//!
//! All modules use `LauncherResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for launcher operations
pub type LauncherResult<T> = Result<T, LauncherError>;

/// All errors that can occur while launching Clojure
#[derive(Error, Debug)]
pub enum LauncherError {
    // Argument grammar errors
    #[error("missing application argument (0)")]
    MissingProgram,

    #[error("{what} option {flag} defined more than one time")]
    DuplicateOption { what: &'static str, flag: String },

    #[error("{what} not defined for {flag} option")]
    MissingValue { what: &'static str, flag: String },

    #[error("threads value '{0}' is not a number")]
    InvalidThreads(String),

    #[error("empty report target is not valid for {0} option")]
    EmptyReportTarget(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("{flag} is no longer supported, use -A with repl, -M for main, -X for exec, -T for tool")]
    RemovedOption { flag: String },

    #[error("option changed, use: {replacement}")]
    ChangedOption { replacement: &'static str },

    #[error("-A requires an alias")]
    AliasRequired,

    #[error("readline option {0} can only be used with clj")]
    ReadlineClojure(String),

    #[error("could not retrieve windows command line using wmic")]
    CommandLineUnavailable,

    // Environment errors
    #[error("could not find java executable")]
    JavaNotFound,

    #[error("could not determine the user home directory")]
    HomeNotFound,

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // Installation errors
    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Failed to extract {path}: {reason}")]
    Extract { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command exited with code {code}: {command}")]
    ChildExit { command: String, code: i32 },

    #[error("Process terminated by signal")]
    ProcessSignaled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LauncherError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Process exit code to report for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ChildExit { code, .. } if *code > 0 && *code < 256 => *code,
            _ => 1,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::JavaNotFound => Some("Set JAVA_HOME or JAVA_CMD, or put java on the PATH"),
            Self::HomeNotFound => Some("Set HOME or CLJ_CONFIG"),
            Self::InvalidOption(_) | Self::AliasRequired => Some("Run: clojure --help"),
            Self::CommandLineUnavailable => Some("Pass --native-args to skip command line re-parsing"),
            _ => None,
        }
    }
}
