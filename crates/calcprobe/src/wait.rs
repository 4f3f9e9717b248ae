//! Bounded waits over a [`CalculatorSession`].
//!
//! Waits poll at a fixed interval until an element reaches the requested
//! state or the budget runs out, in which case they fail with
//! [`HarnessError::Timeout`]. Errors raised by the session while polling are
//! returned immediately.

use std::time::Duration;
use tokio::time::Instant;

use crate::locator::Selector;
use crate::result::{HarnessError, HarnessResult};
use crate::session::CalculatorSession;

/// Default presence timeout (10 seconds)
pub const DEFAULT_PRESENCE_TIMEOUT_MS: u64 = 10_000;

/// Default interactability timeout (2 seconds)
pub const DEFAULT_INTERACTABLE_TIMEOUT_MS: u64 = 2_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// State an element must reach before a wait resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// Present in the UI tree
    Attached,
    /// Present and interactable
    Interactable,
}

impl ElementState {
    /// Name used in diagnostics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attached => "presence",
            Self::Interactable => "interactability",
        }
    }
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_PRESENCE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Wait until an element matching `selector` reaches `state`.
///
/// The condition is always checked at least once, so a zero timeout still
/// succeeds for an element that is already there.
///
/// # Errors
///
/// [`HarnessError::Timeout`] when the budget is exhausted, or any error the
/// session raises while polling.
pub async fn wait_for_element<S>(
    session: &S,
    selector: &Selector,
    state: ElementState,
    options: &WaitOptions,
) -> HarnessResult<S::Element>
where
    S: CalculatorSession + ?Sized,
{
    let start = Instant::now();
    loop {
        if let Some(element) = session.find_matching(selector).await? {
            let ready = match state {
                ElementState::Attached => true,
                ElementState::Interactable => session.is_interactable(&element).await?,
            };
            if ready {
                tracing::trace!(
                    %selector,
                    %state,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "wait satisfied"
                );
                return Ok(element);
            }
        }

        if start.elapsed() >= options.timeout() {
            return Err(HarnessError::Timeout {
                what: format!("{state} of {selector}"),
                ms: options.timeout_ms,
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}
