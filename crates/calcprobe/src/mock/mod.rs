//! Simulated calculator session for testing without a browser.
//!
//! [`MockSession`] renders the same element tree the real widget exposes
//! (round-button digits, functional buttons by id, the exponent popover
//! keypad and the `input` display) over an in-memory [`Calculator`], and can
//! inject the timing faults the activator has to survive.

mod calculator;

pub use calculator::{group_digits, Calculator, ERROR_TEXT};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::keypad::{Key, DISPLAY_ID, EXPONENT_KEYPAD_ID};
use crate::locator::{Selector, EXPONENT_KEYPAD_CLASS, ROUND_BUTTON_CLASS};
use crate::result::{HarnessError, HarnessResult};
use crate::session::{CalculatorSession, SessionProvider};

/// Checks value meaning "never becomes interactable"
pub const FOREVER: u32 = u32::MAX;

/// Handle to an element of the simulated page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockElement {
    index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Display,
    Digit(char),
    Key(Key),
    KeypadContainer,
    KeypadDigit(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForceFault {
    /// Scripted click throws inside the page
    Throws,
    /// Browser goes away during the scripted click
    ClosesSession,
}

#[derive(Debug, Clone)]
struct MockNode {
    id: Option<String>,
    classes: String,
    text: String,
    role: Role,
}

impl MockNode {
    fn label(&self) -> String {
        self.id
            .as_ref()
            .map_or_else(|| format!("{}:{}", self.classes, self.text), Clone::clone)
    }
}

#[derive(Debug)]
struct MockPage {
    nodes: Vec<MockNode>,
    calculator: Calculator,
    /// Non-interactable checks left per node
    obscured: HashMap<usize, u32>,
    /// Stale-element errors left per node on scroll
    stale_scrolls: HashMap<usize, u32>,
    /// Successful lookups left per node before lookups go stale
    lookups_left: HashMap<usize, u32>,
    force_faults: HashMap<usize, ForceFault>,
    /// Non-interactable checks a freshly opened keypad reports
    keypad_animation: u32,
    keypad_settling: u32,
    unavailable: bool,
    call_history: Vec<String>,
}

impl MockPage {
    fn standard() -> Self {
        let mut nodes = vec![MockNode {
            id: Some(DISPLAY_ID.to_string()),
            classes: "input".to_string(),
            text: String::new(),
            role: Role::Display,
        }];
        for digit in "1234567890".chars() {
            nodes.push(MockNode {
                id: None,
                classes: format!("{ROUND_BUTTON_CLASS} digit"),
                text: digit.to_string(),
                role: Role::Digit(digit),
            });
        }
        for key in Key::ALL {
            nodes.push(MockNode {
                id: Some(key.id().to_string()),
                classes: format!("{ROUND_BUTTON_CLASS} symbol"),
                text: key.glyph().to_string(),
                role: Role::Key(key),
            });
        }
        nodes.push(MockNode {
            id: Some(EXPONENT_KEYPAD_ID.to_string()),
            classes: "keyboard popover".to_string(),
            text: String::new(),
            role: Role::KeypadContainer,
        });
        for digit in "0123456789".chars() {
            nodes.push(MockNode {
                id: None,
                classes: EXPONENT_KEYPAD_CLASS.to_string(),
                text: digit.to_string(),
                role: Role::KeypadDigit(digit),
            });
        }

        Self {
            nodes,
            calculator: Calculator::new(),
            obscured: HashMap::new(),
            stale_scrolls: HashMap::new(),
            lookups_left: HashMap::new(),
            force_faults: HashMap::new(),
            keypad_animation: 0,
            keypad_settling: 0,
            unavailable: false,
            call_history: Vec::new(),
        }
    }

    fn check_available(&self) -> HarnessResult<()> {
        if self.unavailable {
            Err(HarnessError::session("mock session is closed"))
        } else {
            Ok(())
        }
    }

    fn node(&self, element: MockElement) -> HarnessResult<&MockNode> {
        self.nodes
            .get(element.index)
            .ok_or_else(|| HarnessError::interaction("<detached>", "stale element reference"))
    }

    fn matching(&self, selector: &Selector) -> Vec<MockElement> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| selector.matches(n.id.as_deref(), &n.classes, &n.text))
            .map(|(index, _)| MockElement { index })
            .collect()
    }

    /// Count a lookup of `element`, failing once its lookups are used up
    fn look_up(&mut self, element: MockElement) -> HarnessResult<()> {
        let Some(left) = self.lookups_left.get_mut(&element.index) else {
            return Ok(());
        };
        if *left > 0 {
            *left -= 1;
            return Ok(());
        }
        let label = self.node(element)?.label();
        Err(HarnessError::interaction(label, "stale element reference"))
    }

    fn find_target(&self, target: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.id.as_deref() == Some(target))
            .or_else(|| {
                self.nodes
                    .iter()
                    .position(|n| matches!(n.role, Role::Digit(_)) && n.text == target)
            })
    }

    fn is_keypad_node(role: Role) -> bool {
        matches!(role, Role::KeypadDigit(_) | Role::KeypadContainer)
    }

    /// Current blocking state without consuming any counters
    fn blocked(&self, index: usize, role: Role) -> bool {
        if Self::is_keypad_node(role)
            && (!self.calculator.keypad_open() || self.keypad_settling > 0)
        {
            return true;
        }
        self.obscured.get(&index).is_some_and(|left| *left > 0)
    }

    /// Interactability check; each negative answer consumes one tick
    fn check_interactable(&mut self, index: usize, role: Role) -> bool {
        if Self::is_keypad_node(role) {
            if !self.calculator.keypad_open() {
                return false;
            }
            if self.keypad_settling > 0 {
                self.keypad_settling -= 1;
                return false;
            }
        }
        match self.obscured.get_mut(&index) {
            Some(left) if *left > 0 => {
                if *left != FOREVER {
                    *left -= 1;
                }
                false
            }
            _ => true,
        }
    }

    fn activate(&mut self, role: Role) {
        let was_open = self.calculator.keypad_open();
        match role {
            Role::Digit(d) => self.calculator.press_digit(d),
            Role::Key(key) => self.calculator.press(key),
            Role::KeypadDigit(d) => self.calculator.press_exponent_digit(d),
            Role::Display | Role::KeypadContainer => {}
        }
        if !was_open && self.calculator.keypad_open() {
            self.keypad_settling = self.keypad_animation;
        }
    }
}

/// In-process calculator session
#[derive(Debug)]
pub struct MockSession {
    page: Mutex<MockPage>,
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSession {
    /// Create a session showing a cleared calculator
    #[must_use]
    pub fn new() -> Self {
        Self {
            page: Mutex::new(MockPage::standard()),
        }
    }

    fn page(&self) -> HarnessResult<MutexGuard<'_, MockPage>> {
        self.page
            .lock()
            .map_err(|_| HarnessError::session("mock page lock poisoned"))
    }

    fn configure(self, f: impl FnOnce(&mut MockPage)) -> Self {
        if let Ok(mut page) = self.page.lock() {
            f(&mut page);
        }
        self
    }

    /// Report `target` (an id or a digit's text) as not interactable for the
    /// next `checks` interactability checks ([`FOREVER`] for never)
    #[must_use]
    pub fn with_obscured(self, target: &str, checks: u32) -> Self {
        self.configure(|page| {
            if let Some(index) = page.find_target(target) {
                page.obscured.insert(index, checks);
            }
        })
    }

    /// Fail the next `times` scrolls of `target` with a stale-element error
    #[must_use]
    pub fn with_stale_scroll(self, target: &str, times: u32) -> Self {
        self.configure(|page| {
            if let Some(index) = page.find_target(target) {
                page.stale_scrolls.insert(index, times);
            }
        })
    }

    /// Let `target` be looked up `lookups` times, then fail every further
    /// lookup with a stale-element error
    #[must_use]
    pub fn with_stale_lookup(self, target: &str, lookups: u32) -> Self {
        self.configure(|page| {
            if let Some(index) = page.find_target(target) {
                page.lookups_left.insert(index, lookups);
            }
        })
    }

    /// Make the scripted (forced) click on `target` throw
    #[must_use]
    pub fn with_failing_force(self, target: &str) -> Self {
        self.configure(|page| {
            if let Some(index) = page.find_target(target) {
                page.force_faults.insert(index, ForceFault::Throws);
            }
        })
    }

    /// Close the session when `target` is force-clicked
    #[must_use]
    pub fn closing_on_force(self, target: &str) -> Self {
        self.configure(|page| {
            if let Some(index) = page.find_target(target) {
                page.force_faults.insert(index, ForceFault::ClosesSession);
            }
        })
    }

    /// Keep the exponent keypad non-interactable for `checks` checks after
    /// it opens ([`FOREVER`] for an animation that never settles)
    #[must_use]
    pub fn with_keypad_animation(self, checks: u32) -> Self {
        self.configure(|page| page.keypad_animation = checks)
    }

    /// Remove `target` from the page entirely
    #[must_use]
    pub fn without(self, target: &str) -> Self {
        self.configure(|page| {
            if let Some(index) = page.find_target(target) {
                // detach by clearing every attribute a selector can match on
                let node = &mut page.nodes[index];
                node.id = None;
                node.classes.clear();
                node.text.clear();
            }
        })
    }

    /// Make every call fail as if the browser went away
    #[must_use]
    pub fn unavailable(self) -> Self {
        self.configure(|page| page.unavailable = true)
    }

    /// Raw (un-normalized) display text
    #[must_use]
    pub fn raw_display(&self) -> String {
        self.page()
            .map(|page| page.calculator.display())
            .unwrap_or_default()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.page()
            .map(|page| page.call_history.clone())
            .unwrap_or_default()
    }

    /// Check if any call starts with `prefix`
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.call_count(prefix) > 0
    }

    /// Count calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.page()
            .map(|page| {
                page.call_history
                    .iter()
                    .filter(|c| c.starts_with(prefix))
                    .count()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl CalculatorSession for MockSession {
    type Element = MockElement;

    async fn find_matching(&self, selector: &Selector) -> HarnessResult<Option<MockElement>> {
        let mut page = self.page()?;
        page.check_available()?;
        let found = page.matching(selector).into_iter().next();
        if let Some(element) = found {
            page.look_up(element)?;
        }
        Ok(found)
    }

    async fn find_all_matching(&self, selector: &Selector) -> HarnessResult<Vec<MockElement>> {
        let page = self.page()?;
        page.check_available()?;
        Ok(page.matching(selector))
    }

    async fn scroll_into_view(&self, element: &MockElement) -> HarnessResult<()> {
        let mut page = self.page()?;
        page.check_available()?;
        let label = page.node(*element)?.label();
        page.call_history.push(format!("scroll:{label}"));
        if let Some(left) = page.stale_scrolls.get_mut(&element.index) {
            if *left > 0 {
                *left -= 1;
                return Err(HarnessError::interaction(
                    label,
                    "stale element reference during scroll",
                ));
            }
        }
        Ok(())
    }

    async fn is_interactable(&self, element: &MockElement) -> HarnessResult<bool> {
        let mut page = self.page()?;
        page.check_available()?;
        let role = page.node(*element)?.role;
        Ok(page.check_interactable(element.index, role))
    }

    async fn trigger_activation(&self, element: &MockElement) -> HarnessResult<()> {
        let mut page = self.page()?;
        page.check_available()?;
        let node = page.node(*element)?;
        let (label, role) = (node.label(), node.role);
        if page.blocked(element.index, role) {
            return Err(HarnessError::interaction(
                label,
                "element click intercepted by another element",
            ));
        }
        page.call_history.push(format!("click:{label}"));
        page.activate(role);
        Ok(())
    }

    async fn force_trigger_activation(&self, element: &MockElement) -> HarnessResult<()> {
        let mut page = self.page()?;
        page.check_available()?;
        let node = page.node(*element)?;
        let (label, role) = (node.label(), node.role);
        page.call_history.push(format!("force_click:{label}"));
        match page.force_faults.get(&element.index) {
            Some(ForceFault::Throws) => Err(HarnessError::interaction(
                label,
                "javascript error: element.click is not a function",
            )),
            Some(ForceFault::ClosesSession) => {
                page.unavailable = true;
                Err(HarnessError::session("browser closed during scripted click"))
            }
            None => {
                page.activate(role);
                Ok(())
            }
        }
    }

    async fn read_attribute(
        &self,
        element: &MockElement,
        name: &str,
    ) -> HarnessResult<Option<String>> {
        let page = self.page()?;
        page.check_available()?;
        let node = page.node(*element)?;
        Ok(match (name, node.role) {
            ("value", Role::Display) => Some(page.calculator.display()),
            ("value", _) => None,
            ("id", _) => node.id.clone(),
            ("class", _) => Some(node.classes.clone()),
            _ => None,
        })
    }
}

/// Opens a fresh [`MockSession`] per scenario
#[derive(Default)]
pub struct MockProvider {
    factory: Option<Box<dyn Fn() -> MockSession + Send + Sync>>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("custom_factory", &self.factory.is_some())
            .finish()
    }
}

impl MockProvider {
    /// Provider of standard sessions
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider building each session with `factory`
    #[must_use]
    pub fn with_factory(factory: impl Fn() -> MockSession + Send + Sync + 'static) -> Self {
        Self {
            factory: Some(Box::new(factory)),
        }
    }
}

#[async_trait]
impl SessionProvider for MockProvider {
    type Session = MockSession;

    async fn open(&self) -> HarnessResult<MockSession> {
        Ok(self.factory.as_ref().map_or_else(MockSession::new, |f| f()))
    }

    async fn close(&self, session: MockSession) -> HarnessResult<()> {
        if let Ok(mut page) = session.page.lock() {
            page.call_history.push("close".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::ButtonRef;

    async fn click(session: &MockSession, button: ButtonRef) {
        let element = session
            .find_matching(&button.resolve())
            .await
            .unwrap()
            .unwrap();
        session.trigger_activation(&element).await.unwrap();
    }

    mod tree_tests {
        use super::*;

        #[tokio::test]
        async fn test_digit_buttons_are_unique_by_text() {
            let session = MockSession::new();
            for digit in "0123456789".chars() {
                let all = session
                    .find_all_matching(&ButtonRef::symbol(digit.to_string()).resolve())
                    .await
                    .unwrap();
                assert_eq!(all.len(), 1, "digit {digit}");
            }
        }

        #[tokio::test]
        async fn test_every_key_is_present_by_id() {
            let session = MockSession::new();
            for key in Key::ALL {
                let found = session.find_matching(&key.button().resolve()).await.unwrap();
                assert!(found.is_some(), "{}", key.id());
            }
        }

        #[tokio::test]
        async fn test_display_value_attribute() {
            let session = MockSession::new();
            let display = session
                .find_matching(&Selector::id(DISPLAY_ID))
                .await
                .unwrap()
                .unwrap();
            let value = session.read_attribute(&display, "value").await.unwrap();
            assert_eq!(value.as_deref(), Some("0"));
            let missing = session.read_attribute(&display, "data-x").await.unwrap();
            assert!(missing.is_none());
        }

        #[tokio::test]
        async fn test_without_removes_element() {
            let session = MockSession::new().without("symbolRoot");
            let found = session
                .find_matching(&Key::Root.button().resolve())
                .await
                .unwrap();
            assert!(found.is_none());
        }
    }

    mod interaction_tests {
        use super::*;

        #[tokio::test]
        async fn test_clicks_drive_calculator() {
            let session = MockSession::new();
            click(&session, ButtonRef::symbol("1")).await;
            click(&session, ButtonRef::symbol("2")).await;
            click(&session, ButtonRef::symbol("3")).await;
            click(&session, ButtonRef::symbol("4")).await;
            assert_eq!(session.raw_display(), "1 234");
            assert_eq!(session.call_count("click:"), 4);
        }

        #[tokio::test]
        async fn test_obscured_click_is_intercepted() {
            let session = MockSession::new().with_obscured("symbolMinus", FOREVER);
            let element = session
                .find_matching(&Key::Minus.button().resolve())
                .await
                .unwrap()
                .unwrap();
            assert!(!session.is_interactable(&element).await.unwrap());
            let err = session.trigger_activation(&element).await.unwrap_err();
            assert!(err.to_string().contains("intercepted"));
            session.force_trigger_activation(&element).await.unwrap();
            assert!(session.was_called("force_click:symbolMinus"));
        }

        #[tokio::test]
        async fn test_obscured_counts_down() {
            let session = MockSession::new().with_obscured("7", 2);
            let element = session
                .find_matching(&ButtonRef::symbol("7").resolve())
                .await
                .unwrap()
                .unwrap();
            assert!(!session.is_interactable(&element).await.unwrap());
            assert!(!session.is_interactable(&element).await.unwrap());
            assert!(session.is_interactable(&element).await.unwrap());
        }

        #[tokio::test]
        async fn test_stale_scroll_fails_once() {
            let session = MockSession::new().with_stale_scroll("symbolEqual", 1);
            let element = session
                .find_matching(&Key::Equal.button().resolve())
                .await
                .unwrap()
                .unwrap();
            assert!(session.scroll_into_view(&element).await.is_err());
            assert!(session.scroll_into_view(&element).await.is_ok());
        }

        #[tokio::test]
        async fn test_keypad_hidden_until_exponent_pressed() {
            let session = MockSession::new().with_keypad_animation(1);
            let digit = session
                .find_matching(&ButtonRef::exponent_digit('3').resolve())
                .await
                .unwrap()
                .unwrap();
            assert!(!session.is_interactable(&digit).await.unwrap());

            click(&session, ButtonRef::symbol("2")).await;
            click(&session, Key::Exponent.button()).await;
            // one animation tick, then settled
            assert!(!session.is_interactable(&digit).await.unwrap());
            assert!(session.is_interactable(&digit).await.unwrap());
        }

        #[tokio::test]
        async fn test_stale_lookup_after_budget() {
            let session = MockSession::new().with_stale_lookup("symbolMinus", 1);
            let selector = Key::Minus.button().resolve();
            assert!(session.find_matching(&selector).await.unwrap().is_some());
            let err = session.find_matching(&selector).await.unwrap_err();
            assert!(err.to_string().contains("stale"));
            assert!(!err.is_session_level());
        }

        #[tokio::test]
        async fn test_force_faults() {
            let session = MockSession::new()
                .with_failing_force("symbolPlus")
                .closing_on_force("symbolMinus");
            let plus = session
                .find_matching(&Key::Plus.button().resolve())
                .await
                .unwrap()
                .unwrap();
            let err = session.force_trigger_activation(&plus).await.unwrap_err();
            assert!(!err.is_session_level());
            assert_eq!(session.raw_display(), "0");

            let minus = session
                .find_matching(&Key::Minus.button().resolve())
                .await
                .unwrap()
                .unwrap();
            let err = session.force_trigger_activation(&minus).await.unwrap_err();
            assert!(err.is_session_level());
            assert!(session.find_matching(&Selector::id(DISPLAY_ID)).await.is_err());
        }

        #[tokio::test]
        async fn test_unavailable_session_errors() {
            let session = MockSession::new().unavailable();
            let err = session
                .find_matching(&Selector::id(DISPLAY_ID))
                .await
                .unwrap_err();
            assert!(err.is_session_level());
        }
    }

    mod provider_tests {
        use super::*;

        #[tokio::test]
        async fn test_provider_opens_fresh_sessions() {
            let provider = MockProvider::new();
            let first = provider.open().await.unwrap();
            click(&first, ButtonRef::symbol("9")).await;
            let second = provider.open().await.unwrap();
            assert_eq!(first.raw_display(), "9");
            assert_eq!(second.raw_display(), "0");
            provider.close(first).await.unwrap();
        }

        #[tokio::test]
        async fn test_provider_factory() {
            let provider = MockProvider::with_factory(|| MockSession::new().unavailable());
            let session = provider.open().await.unwrap();
            assert!(session.find_matching(&Selector::id(DISPLAY_ID)).await.is_err());
        }
    }
}
