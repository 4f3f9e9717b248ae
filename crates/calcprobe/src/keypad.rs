//! Vocabulary of the calculator widget: element ids of its functional keys,
//! the display and the exponent popover.

use serde::{Deserialize, Serialize};

use crate::locator::{ButtonRef, Selector};

/// Id of the output field
pub const DISPLAY_ID: &str = "input";

/// Id of the exponent popover keypad container
pub const EXPONENT_KEYPAD_ID: &str = "keyboardExponent";

/// Attribute holding the display's current text
pub const DISPLAY_ATTRIBUTE: &str = "value";

/// Functional key identified by a unique id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Reset to a cleared state
    Clear,
    /// Addition
    Plus,
    /// Subtraction
    Minus,
    /// Multiplication
    Multiply,
    /// Division
    Divide,
    /// Evaluate
    Equal,
    /// Square root (prefix)
    Root,
    /// Factorial (postfix)
    Factorial,
    /// Percentage (postfix)
    Percent,
    /// Opens the exponent keypad
    Exponent,
    /// Confirms the exponent keypad entry
    Confirm,
}

impl Key {
    /// Every functional key
    pub const ALL: [Self; 11] = [
        Self::Clear,
        Self::Plus,
        Self::Minus,
        Self::Multiply,
        Self::Divide,
        Self::Equal,
        Self::Root,
        Self::Factorial,
        Self::Percent,
        Self::Exponent,
        Self::Confirm,
    ];

    /// DOM id of the key
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Clear => "symbolClear",
            Self::Plus => "symbolPlus",
            Self::Minus => "symbolMinus",
            Self::Multiply => "symbolMultiply",
            Self::Divide => "symbolDivide",
            Self::Equal => "symbolEqual",
            Self::Root => "symbolRoot",
            Self::Factorial => "symbolExclamation",
            Self::Percent => "symbolPercent",
            Self::Exponent => "symbolExponent",
            Self::Confirm => "buttonOK",
        }
    }

    /// Glyph rendered on the key
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Clear => "C",
            Self::Plus => "+",
            Self::Minus => "−",
            Self::Multiply => "×",
            Self::Divide => "÷",
            Self::Equal => "=",
            Self::Root => "√",
            Self::Factorial => "n!",
            Self::Percent => "%",
            Self::Exponent => "xʸ",
            Self::Confirm => "OK",
        }
    }

    /// Look a key up by its DOM id
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.id() == id)
    }

    /// Logical reference to the key
    #[must_use]
    pub fn button(self) -> ButtonRef {
        ButtonRef::id(self.id())
    }
}

impl From<Key> for ButtonRef {
    fn from(key: Key) -> Self {
        key.button()
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Selector of the output field; its presence is the readiness gate
#[must_use]
pub fn display_selector() -> Selector {
    Selector::id(DISPLAY_ID)
}
