//! Error types for the CLI

use leadform::{ErrorCategory, LeadformError};
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// A live run was requested from a build without browser support
    #[error("Live runs need the `browser` feature; rebuild with --features browser or pass --simulated")]
    BrowserUnavailable,

    /// Enforced scenarios failed
    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed {
        /// Failed count
        failed: usize,
        /// Total count
        total: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Leadform library error
    #[error("{0}")]
    Suite(#[from] LeadformError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Process exit code: 1 for failing scenarios or broken runs, 2 for usage
    /// and configuration problems
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config { .. } | Self::InvalidArgument { .. } | Self::BrowserUnavailable => 2,
            Self::Suite(e) if matches!(e.category(), ErrorCategory::Configuration) => 2,
            Self::ScenariosFailed { .. } | Self::Io(_) | Self::Suite(_) => 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_failed_scenarios_exit_one() {
        let err = CliError::ScenariosFailed { failed: 2, total: 40 };
        assert_eq!(err.to_string(), "2 of 40 scenarios failed");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_suite_config_error_is_usage() {
        let err: CliError = LeadformError::config("workers must be at least 1").into();
        assert_eq!(err.exit_code(), 2);
        let err: CliError = LeadformError::driver("socket closed").into();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_browser_unavailable_mentions_simulated() {
        assert!(CliError::BrowserUnavailable.to_string().contains("--simulated"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
