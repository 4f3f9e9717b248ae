//! Resilient activation of calculator controls.
//!
//! Activation follows a two-path contract:
//!
//! 1. **Primary**: wait for presence, scroll to the viewport centre, wait for
//!    interactability, then trigger the native gesture.
//! 2. **Fallback**: if any primary step fails, look the element up once
//!    without waiting and force a programmatic activation.
//!
//! Only a fallback that cannot find or force the element yields
//! [`HarnessError::ElementUnreachable`]; session loss is returned unchanged. A settle delay follows every
//! successful activation so the widget can redraw before the display is read.

use std::time::Duration;

use crate::locator::{ButtonRef, Selector};
use crate::result::{HarnessError, HarnessResult};
use crate::session::CalculatorSession;
use crate::wait::{
    wait_for_element, ElementState, WaitOptions, DEFAULT_INTERACTABLE_TIMEOUT_MS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_PRESENCE_TIMEOUT_MS,
};

/// Default settle delay after each activation (200ms)
pub const DEFAULT_SETTLE_MS: u64 = 200;

/// Timing of the activation paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationConfig {
    /// Presence wait budget in milliseconds
    pub presence_timeout_ms: u64,
    /// Interactability wait budget in milliseconds
    pub interactable_timeout_ms: u64,
    /// Polling interval of both waits in milliseconds
    pub poll_interval_ms: u64,
    /// Delay after each activation in milliseconds
    pub settle_ms: u64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            presence_timeout_ms: DEFAULT_PRESENCE_TIMEOUT_MS,
            interactable_timeout_ms: DEFAULT_INTERACTABLE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

impl ActivationConfig {
    /// Set the presence wait budget
    #[must_use]
    pub const fn with_presence_timeout(mut self, ms: u64) -> Self {
        self.presence_timeout_ms = ms;
        self
    }

    /// Set the interactability wait budget
    #[must_use]
    pub const fn with_interactable_timeout(mut self, ms: u64) -> Self {
        self.interactable_timeout_ms = ms;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the settle delay
    #[must_use]
    pub const fn with_settle(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    fn presence(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.presence_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    fn interactable(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.interactable_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// How an activation completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Native gesture on an interactable element
    Success,
    /// Forced programmatic activation after the primary path failed
    Degraded {
        /// Why the primary path failed
        reason: String,
    },
}

impl InteractionOutcome {
    /// Whether the fallback path was taken
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Activates controls, falling back to forced activation
#[derive(Debug, Clone, Default)]
pub struct Activator {
    config: ActivationConfig,
}

impl Activator {
    /// Create an activator with the given timing
    #[must_use]
    pub const fn new(config: ActivationConfig) -> Self {
        Self { config }
    }

    /// Timing in use
    #[must_use]
    pub const fn config(&self) -> &ActivationConfig {
        &self.config
    }

    /// Resolve `button` and activate it
    ///
    /// # Errors
    ///
    /// See [`Activator::activate`].
    pub async fn press<S>(
        &self,
        session: &S,
        button: &ButtonRef,
    ) -> HarnessResult<InteractionOutcome>
    where
        S: CalculatorSession + ?Sized,
    {
        tracing::debug!(%button, "pressing");
        self.activate(session, &button.resolve()).await
    }

    /// Activate the element matching `selector`.
    ///
    /// # Errors
    ///
    /// [`HarnessError::ElementUnreachable`] if no element matches even on the
    /// fallback path, [`HarnessError::SessionUnavailable`] unchanged if the
    /// session goes away.
    pub async fn activate<S>(
        &self,
        session: &S,
        selector: &Selector,
    ) -> HarnessResult<InteractionOutcome>
    where
        S: CalculatorSession + ?Sized,
    {
        let outcome = match self.primary(session, selector).await {
            Ok(()) => InteractionOutcome::Success,
            Err(err) if err.is_session_level() => return Err(err),
            Err(err) => {
                if err.is_timeout() {
                    tracing::debug!(%selector, error = %err, "primary activation timed out, forcing");
                } else {
                    tracing::warn!(%selector, error = %err, "primary activation failed, forcing");
                }
                self.fallback(session, selector, &err).await?;
                InteractionOutcome::Degraded {
                    reason: err.to_string(),
                }
            }
        };

        if self.config.settle_ms > 0 {
            tokio::time::sleep(self.config.settle()).await;
        }
        Ok(outcome)
    }

    async fn primary<S>(&self, session: &S, selector: &Selector) -> HarnessResult<()>
    where
        S: CalculatorSession + ?Sized,
    {
        let element =
            wait_for_element(session, selector, ElementState::Attached, &self.config.presence())
                .await?;
        session.scroll_into_view(&element).await?;
        // re-resolve: scrolling can re-render the node
        let element = wait_for_element(
            session,
            selector,
            ElementState::Interactable,
            &self.config.interactable(),
        )
        .await?;
        session.trigger_activation(&element).await?;
        tracing::debug!(%selector, "activated");
        Ok(())
    }

    async fn fallback<S>(
        &self,
        session: &S,
        selector: &Selector,
        cause: &HarnessError,
    ) -> HarnessResult<()>
    where
        S: CalculatorSession + ?Sized,
    {
        let Some(element) = session
            .find_matching(selector)
            .await
            .map_err(|err| unreachable(selector, err))?
        else {
            return Err(HarnessError::ElementUnreachable {
                selector: selector.to_string(),
                cause: cause.to_string(),
            });
        };
        session
            .force_trigger_activation(&element)
            .await
            .map_err(|err| unreachable(selector, err))
    }
}

/// Fallback failures end the attempt; only session loss passes through as is
fn unreachable(selector: &Selector, err: HarnessError) -> HarnessError {
    if err.is_session_level() {
        err
    } else {
        HarnessError::ElementUnreachable {
            selector: selector.to_string(),
            cause: err.to_string(),
        }
    }
}
