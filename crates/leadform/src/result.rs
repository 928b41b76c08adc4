//! Result and error types for leadform.
//!
//! Failures fall into distinct categories so a scenario report can tell a
//! broken selector apart from the site accepting input it should reject.

use thiserror::Error;

/// Result type for leadform operations
pub type LeadformResult<T> = Result<T, LeadformError>;

/// Errors that can occur while driving or asserting the lead form
#[derive(Debug, Error)]
pub enum LeadformError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Low-level driver or protocol failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// A locator resolved to no element
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Locator description
        locator: String,
    },

    /// Element exists but cannot take input
    #[error("Element {locator} is not interactable: {reason}")]
    ElementNotInteractable {
        /// Locator description
        locator: String,
        /// Why the interaction was refused
        reason: String,
    },

    /// Observed page state does not match the expected step outcome
    #[error("Outcome mismatch on {step}: expected {expected}; observed {observed}")]
    OutcomeMismatch {
        /// Step (or page region) under assertion
        step: String,
        /// Expected outcome
        expected: String,
        /// What the page actually showed
        observed: String,
    },

    /// An element changed visibility during a settle window
    #[error(
        "BUG DETECTED: Element became {became} during {duration_ms}ms wait period. \
         Form proceeded when it should not. ({locator} after {elapsed_ms}ms)"
    )]
    StateChangedUnexpectedly {
        /// Locator description
        locator: String,
        /// "hidden" or "visible"
        became: String,
        /// Time into the window at which the change was seen
        elapsed_ms: u64,
        /// Total settle window
        duration_ms: u64,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Condition being waited for
        waited_for: String,
    },

    /// A scenario or helper was used against the wrong step or field
    #[error("Invalid test definition: {message}")]
    InvalidDefinition {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Coarse classification of a [`LeadformError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorCategory {
    /// Browser, selector or markup problem; not a business validation result
    Infrastructure,
    /// The site reacted differently than the test case expects
    OutcomeMismatch,
    /// The form moved on while it had to stay put
    PrematureTransition,
    /// A bounded wait ran out
    Timeout,
    /// Bad configuration or scenario definition
    Configuration,
}

impl LeadformError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid definition error
    #[must_use]
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
        }
    }

    /// Create an outcome mismatch
    #[must_use]
    pub fn mismatch(
        step: impl Into<String>,
        expected: impl Into<String>,
        observed: impl Into<String>,
    ) -> Self {
        Self::OutcomeMismatch {
            step: step.into(),
            expected: expected.into(),
            observed: observed.into(),
        }
    }

    /// Classify this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::OutcomeMismatch { .. } => ErrorCategory::OutcomeMismatch,
            Self::StateChangedUnexpectedly { .. } => ErrorCategory::PrematureTransition,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::InvalidDefinition { .. } | Self::Config { .. } | Self::Yaml(_) => {
                ErrorCategory::Configuration
            }
            Self::BrowserNotFound
            | Self::BrowserLaunch { .. }
            | Self::Navigation { .. }
            | Self::Driver { .. }
            | Self::ElementNotFound { .. }
            | Self::ElementNotInteractable { .. }
            | Self::Io(_)
            | Self::Json(_) => ErrorCategory::Infrastructure,
        }
    }

    /// Whether this is a business-level failure (as opposed to plumbing)
    #[must_use]
    pub const fn is_validation_failure(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::OutcomeMismatch
                | ErrorCategory::PrematureTransition
                | ErrorCategory::Timeout
        )
    }
}
