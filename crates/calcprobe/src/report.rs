//! Scenario and suite outcomes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::result::HarnessError;

/// Why a scenario failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioFailure {
    /// A checkpoint saw a different display value
    Mismatch {
        /// Arithmetic property being checked
        description: String,
        /// Expected normalized value
        expected: String,
        /// Observed normalized value
        actual: String,
    },
    /// A control could not be found even for forced activation
    Unreachable {
        /// Selector of the control
        selector: String,
        /// Last error seen
        cause: String,
    },
    /// The browser session failed or never became ready
    Session {
        /// Error message
        message: String,
    },
    /// The scenario itself is malformed
    Invalid {
        /// Error message
        message: String,
    },
}

impl From<HarnessError> for ScenarioFailure {
    fn from(err: HarnessError) -> Self {
        match err {
            HarnessError::AssertionMismatch {
                description,
                expected,
                actual,
            } => Self::Mismatch {
                description,
                expected,
                actual,
            },
            HarnessError::ElementUnreachable { selector, cause } => {
                Self::Unreachable { selector, cause }
            }
            HarnessError::SessionUnavailable { message } => Self::Session { message },
            // the activator folds these into ElementUnreachable; direct
            // session callers can still surface them
            HarnessError::Interaction { selector, message } => Self::Unreachable {
                selector,
                cause: message,
            },
            HarnessError::Timeout { what, ms } => Self::Unreachable {
                selector: what,
                cause: format!("timed out after {ms}ms"),
            },
            HarnessError::InvalidScenario { message, .. } | HarnessError::Config { message } => {
                Self::Invalid { message }
            }
            other @ (HarnessError::Io(_) | HarnessError::Json(_) | HarnessError::Yaml(_)) => {
                Self::Session {
                    message: other.to_string(),
                }
            }
        }
    }
}

impl std::fmt::Display for ScenarioFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mismatch {
                description,
                expected,
                actual,
            } => write!(f, "{description}: expected {expected:?}, got {actual:?}"),
            Self::Unreachable { selector, cause } => {
                write!(f, "unreachable {selector}: {cause}")
            }
            Self::Session { message } => write!(f, "session: {message}"),
            Self::Invalid { message } => write!(f, "invalid scenario: {message}"),
        }
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Whether every checkpoint held
    pub passed: bool,
    /// First failure, if any
    pub failure: Option<ScenarioFailure>,
    /// Checkpoints that held before the run stopped
    pub checkpoints_passed: usize,
    /// Button activations performed
    pub activations: usize,
    /// Activations that needed the forced fallback
    pub degraded: usize,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// Create an empty passing report
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            failure: None,
            checkpoints_passed: 0,
            activations: 0,
            degraded: 0,
            duration_ms: 0,
        }
    }

    /// Mark as failed
    #[must_use]
    pub fn fail(mut self, failure: impl Into<ScenarioFailure>) -> Self {
        self.passed = false;
        self.failure = Some(failure.into());
        self
    }

    /// Set duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

/// Outcomes of a suite run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Individual scenario reports, in run order
    pub scenarios: Vec<ScenarioReport>,
    /// Total wall time in milliseconds
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed(&self) -> usize {
        self.scenarios.iter().filter(|r| !r.passed).count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.scenarios.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.scenarios.iter().filter(|r| !r.passed).collect()
    }

    /// Activations that needed the forced fallback, across the suite
    #[must_use]
    pub fn degraded(&self) -> usize {
        self.scenarios.iter().map(|r| r.degraded).sum()
    }

    /// Serialize as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> crate::result::HarnessResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
