//! Locator resolution for calculator controls.
//!
//! Digit and glyph buttons are rendered as siblings sharing one class and are
//! told apart only by their visible text, so they resolve to a class + exact
//! text match. Functional buttons carry a unique id.
//!
//! Resolution is pure string construction and never fails; a reference that
//! matches nothing surfaces later as [`HarnessError::ElementUnreachable`].
//!
//! [`HarnessError::ElementUnreachable`]: crate::HarnessError::ElementUnreachable

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class shared by the main keypad's digit-like buttons
pub const ROUND_BUTTON_CLASS: &str = "round_btn";

/// Class shared by the exponent popover keypad's digits
pub const EXPONENT_KEYPAD_CLASS: &str = "btnKeyboardExponent";

/// Family of text-distinguished buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ButtonFamily {
    /// Main keypad ("round" buttons)
    #[default]
    Round,
    /// Auxiliary exponent keypad shown in a popover
    ExponentKeypad,
}

impl ButtonFamily {
    /// CSS class carried by every member of the family
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Round => ROUND_BUTTON_CLASS,
            Self::ExponentKeypad => EXPONENT_KEYPAD_CLASS,
        }
    }
}

/// Logical reference to a calculator control
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ButtonRef {
    /// Button identified by its visible text within a family
    Symbol {
        /// Visible text, compared after whitespace normalization
        text: String,
        /// Which family of buttons to search
        #[serde(default)]
        family: ButtonFamily,
    },
    /// Button identified by a unique DOM id
    Id {
        /// Element id
        identifier: String,
    },
}

impl ButtonRef {
    /// Reference a main keypad button by its text
    #[must_use]
    pub fn symbol(text: impl Into<String>) -> Self {
        Self::Symbol {
            text: text.into(),
            family: ButtonFamily::Round,
        }
    }

    /// Reference a digit on the exponent popover keypad
    #[must_use]
    pub fn exponent_digit(digit: char) -> Self {
        Self::Symbol {
            text: digit.to_string(),
            family: ButtonFamily::ExponentKeypad,
        }
    }

    /// Reference a button by id
    #[must_use]
    pub fn id(identifier: impl Into<String>) -> Self {
        Self::Id {
            identifier: identifier.into(),
        }
    }

    /// Resolve to a selector against the live UI tree
    #[must_use]
    pub fn resolve(&self) -> Selector {
        resolve(self)
    }
}

impl fmt::Display for ButtonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol { text, family } => match family {
                ButtonFamily::Round => write!(f, "'{text}'"),
                ButtonFamily::ExponentKeypad => write!(f, "exponent '{text}'"),
            },
            Self::Id { identifier } => write!(f, "#{identifier}"),
        }
    }
}

/// Selector for locating elements in the rendered UI tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Unique element carrying an id
    Id(String),
    /// Any element of a class whose normalized text equals `text` exactly
    ClassWithText {
        /// Class token the element must carry
        class: String,
        /// Exact normalized text content
        text: String,
    },
}

impl Selector {
    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a class + exact text selector
    #[must_use]
    pub fn class_with_text(class: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ClassWithText {
            class: class.into(),
            text: text.into(),
        }
    }

    /// Convert to an XPath expression
    #[must_use]
    pub fn to_xpath(&self) -> String {
        match self {
            Self::Id(id) => format!("//*[@id={}]", xpath_literal(id)),
            Self::ClassWithText { class, text } => format!(
                "//div[contains(concat(' ', normalize-space(@class), ' '), {}) and normalize-space(text())={}]",
                xpath_literal(&format!(" {class} ")),
                xpath_literal(&normalize_text(text)),
            ),
        }
    }

    /// Check a candidate element's id, classes and text against this selector.
    ///
    /// Mirrors the XPath semantics for in-process sessions.
    #[must_use]
    pub fn matches(&self, id: Option<&str>, classes: &str, text: &str) -> bool {
        match self {
            Self::Id(want) => id == Some(want.as_str()),
            Self::ClassWithText { class, text: want } => {
                classes.split_whitespace().any(|c| c == class)
                    && normalize_text(text) == normalize_text(want)
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath())
    }
}

/// Map a logical button reference to a selector
#[must_use]
pub fn resolve(button: &ButtonRef) -> Selector {
    match button {
        ButtonRef::Symbol { text, family } => Selector::class_with_text(family.class_name(), text),
        ButtonRef::Id { identifier } => Selector::id(identifier),
    }
}

/// XPath `normalize-space`: trim and collapse internal whitespace runs
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Quote a string as an XPath 1.0 literal.
///
/// XPath has no escape sequences, so a value holding both quote kinds is
/// spliced together with `concat()`.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_symbol_resolves_to_round_family() {
            let selector = resolve(&ButtonRef::symbol("7"));
            assert_eq!(selector, Selector::class_with_text("round_btn", "7"));
        }

        #[test]
        fn test_exponent_digit_resolves_to_keypad_family() {
            let selector = ButtonRef::exponent_digit('3').resolve();
            assert_eq!(
                selector,
                Selector::class_with_text("btnKeyboardExponent", "3")
            );
        }

        #[test]
        fn test_id_resolves_to_id() {
            let selector = resolve(&ButtonRef::id("symbolMinus"));
            assert_eq!(selector, Selector::Id("symbolMinus".to_string()));
        }
    }

    mod xpath_tests {
        use super::*;

        #[test]
        fn test_id_xpath() {
            assert_eq!(
                Selector::id("symbolEqual").to_xpath(),
                "//*[@id='symbolEqual']"
            );
        }

        #[test]
        fn test_class_with_text_uses_exact_match() {
            let xpath = Selector::class_with_text("round_btn", "1").to_xpath();
            assert!(xpath.contains("normalize-space(text())='1'"));
            assert!(xpath.contains("' round_btn '"));
            assert!(!xpath.contains("contains(text()"));
        }

        #[test]
        fn test_literal_plain() {
            assert_eq!(xpath_literal("abc"), "'abc'");
        }

        #[test]
        fn test_literal_single_quote() {
            assert_eq!(xpath_literal("it's"), "\"it's\"");
        }

        #[test]
        fn test_literal_both_quotes() {
            assert_eq!(xpath_literal("a'b\"c"), "concat('a', \"'\", 'b\"c')");
        }
    }

    mod matching_tests {
        use super::*;

        #[test]
        fn test_text_is_not_substring_match() {
            let selector = Selector::class_with_text("round_btn", "1");
            assert!(selector.matches(None, "round_btn", "1"));
            assert!(!selector.matches(None, "round_btn", "10"));
        }

        #[test]
        fn test_text_is_whitespace_normalized() {
            let selector = Selector::class_with_text("round_btn", "5");
            assert!(selector.matches(None, "round_btn big", "  5\n"));
        }

        #[test]
        fn test_class_token_required() {
            let selector = Selector::class_with_text("round_btn", "5");
            assert!(!selector.matches(None, "round_btn_wide", "5"));
            assert!(!selector.matches(None, "btnKeyboardExponent", "5"));
        }

        #[test]
        fn test_id_match() {
            let selector = Selector::id("buttonOK");
            assert!(selector.matches(Some("buttonOK"), "", "OK"));
            assert!(!selector.matches(Some("buttonCancel"), "", "OK"));
            assert!(!selector.matches(None, "", "OK"));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ButtonRef::symbol("4").to_string(), "'4'");
        assert_eq!(ButtonRef::exponent_digit('2').to_string(), "exponent '2'");
        assert_eq!(ButtonRef::id("symbolRoot").to_string(), "#symbolRoot");
    }

    #[test]
    fn test_button_ref_serde_tagged() {
        let json = serde_json::to_string(&ButtonRef::id("symbolClear")).unwrap();
        assert!(json.contains("\"kind\":\"id\""));
        let back: ButtonRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ButtonRef::id("symbolClear"));
    }
}
