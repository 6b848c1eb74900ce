//! CLI error types with exit code handling
//!
//! Every failure the CLI reports maps to an exit code from [`exit_codes`].

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Input is not a usable CRD
    #[error("CRD error: {message}")]
    #[diagnostic(code(cty::cli::crd))]
    Crd {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A source produced no CRDs at all
    #[error("No CRDs found in {source_name}")]
    #[diagnostic(
        code(cty::cli::no_crds),
        help("documents need a spec.versions or spec.validation section to be picked up")
    )]
    NoCrds { source_name: String },

    /// Some CRDs of a batch failed
    #[error("{failed} of {total} CRD(s) failed: {names}")]
    #[diagnostic(code(cty::cli::batch))]
    Batch {
        failed: usize,
        total: usize,
        names: String,
    },

    /// Validation found breaking changes and `--fail-on-breaking` was set
    #[error("{count} breaking change(s) detected")]
    #[diagnostic(code(cty::cli::breaking))]
    BreakingChanges { count: usize },

    /// Fetching a CRD over HTTP failed
    #[error("Failed to fetch {url}: {message}")]
    #[diagnostic(code(cty::cli::fetch))]
    Fetch { url: String, message: String },

    /// Invalid flags or configuration file
    #[error("{message}")]
    #[diagnostic(code(cty::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(cty::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Crd { .. } | CliError::NoCrds { .. } => exit_codes::CRD_ERROR,
            CliError::Batch { .. } => exit_codes::ERROR,
            CliError::BreakingChanges { .. } => exit_codes::BREAKING_CHANGES,
            CliError::Fetch { .. } => exit_codes::NETWORK_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }

    /// Create a CRD error
    pub fn crd(message: impl Into<String>) -> Self {
        Self::Crd {
            message: message.into(),
            help: None,
        }
    }

    /// Create a CRD error with help text
    pub fn crd_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Crd {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Summarize the failed entries of a batch
    pub fn batch(failed: &[String], total: usize) -> Self {
        Self::Batch {
            failed: failed.len(),
            total,
            names: failed.join(", "),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<cty_core::CtyError> for CliError {
    fn from(err: cty_core::CtyError) -> Self {
        match err {
            cty_core::CtyError::Write(io) => io.into(),
            cty_core::CtyError::VersionNotFound { .. } => {
                Self::crd_with_help(err.to_string(), "pass --from/--to with one of the listed versions")
            }
            other => Self::crd(other.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code for a report returned by a command
pub fn exit_code_of(report: &miette::Report) -> i32 {
    report
        .downcast_ref::<CliError>()
        .map(CliError::exit_code)
        .unwrap_or(exit_codes::ERROR)
}
