//! Result and error types for Calcprobe.

use thiserror::Error;

/// Result type for Calcprobe operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving the calculator
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Target control does not exist, even after the forced fallback
    #[error("Element unreachable: {selector} ({cause})")]
    ElementUnreachable {
        /// Selector that matched nothing
        selector: String,
        /// What the last attempt reported
        cause: String,
    },

    /// Display disagrees with the expected value
    #[error("{description}: expected {expected:?}, got {actual:?}")]
    AssertionMismatch {
        /// Arithmetic property being checked
        description: String,
        /// Expected normalized display value
        expected: String,
        /// Actual normalized display value
        actual: String,
    },

    /// Browser session is gone or could not be created
    #[error("Session unavailable: {message}")]
    SessionUnavailable {
        /// Error message
        message: String,
    },

    /// Bounded wait exceeded its budget
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Interaction with an element failed (stale, obscured, detached)
    #[error("Interaction failed on {selector}: {message}")]
    Interaction {
        /// Selector of the element
        selector: String,
        /// Error message
        message: String,
    },

    /// Scenario is malformed
    #[error("Invalid scenario '{name}': {message}")]
    InvalidScenario {
        /// Scenario name
        name: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl HarnessError {
    /// Create a session-unavailable error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::SessionUnavailable {
            message: message.into(),
        }
    }

    /// Create an interaction error
    #[must_use]
    pub fn interaction(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Interaction {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Whether this is a bounded-wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error must be propagated unchanged to the caller
    #[must_use]
    pub const fn is_session_level(&self) -> bool {
        matches!(self, Self::SessionUnavailable { .. })
    }
}
