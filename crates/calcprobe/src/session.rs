//! Browser session capability consumed by the harness.
//!
//! The harness never launches or configures a browser itself. It drives an
//! injected [`CalculatorSession`] with a deliberately narrow surface, handed
//! out one per scenario by a [`SessionProvider`].
//!
//! # Implementations
//!
//! - `ChromiumSession` - CDP via chromiumoxide (`browser` feature)
//! - [`MockSession`](crate::mock::MockSession) - in-process simulated widget

use async_trait::async_trait;

use crate::locator::Selector;
use crate::result::HarnessResult;

/// Minimal browser surface needed to drive the calculator
#[async_trait]
pub trait CalculatorSession: Send + Sync {
    /// Handle to an element in the live UI tree
    type Element: Send + Sync;

    /// First element matching the selector, if any
    async fn find_matching(&self, selector: &Selector) -> HarnessResult<Option<Self::Element>>;

    /// All elements matching the selector, in document order
    async fn find_all_matching(&self, selector: &Selector) -> HarnessResult<Vec<Self::Element>>;

    /// Scroll the element to the viewport centre
    async fn scroll_into_view(&self, element: &Self::Element) -> HarnessResult<()>;

    /// Visible, enabled and not obscured
    async fn is_interactable(&self, element: &Self::Element) -> HarnessResult<bool>;

    /// Standard activation gesture (native click)
    async fn trigger_activation(&self, element: &Self::Element) -> HarnessResult<()>;

    /// Wait-free programmatic activation bypassing interactability checks
    async fn force_trigger_activation(&self, element: &Self::Element) -> HarnessResult<()>;

    /// Current value of an attribute or property
    async fn read_attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> HarnessResult<Option<String>>;
}

/// Hands out independent sessions, one per scenario
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Session type produced by this provider
    type Session: CalculatorSession;

    /// Open a fresh session showing the calculator
    async fn open(&self) -> HarnessResult<Self::Session>;

    /// Tear the session down
    async fn close(&self, session: Self::Session) -> HarnessResult<()>;
}
