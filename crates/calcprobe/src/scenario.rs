//! Declarative scenarios: ordered button presses with display checkpoints.
//!
//! Every scenario starts with a press of the clear key. [`Scenario::new`]
//! inserts it, and the field holding the actions is private, so a scenario
//! can never assume leftover state from a previous one.

use serde::{Deserialize, Serialize};

use crate::keypad::Key;
use crate::locator::{ButtonFamily, ButtonRef};
use crate::result::{HarnessError, HarnessResult};

/// Single unit of input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Activate one button
    Press {
        /// Button to activate
        button: ButtonRef,
    },
    /// Press one main-keypad button per character, in order
    TypeDigits {
        /// Characters to enter
        digits: String,
    },
}

impl Step {
    /// Expand into the individual presses it stands for
    #[must_use]
    pub fn presses(&self) -> Vec<ButtonRef> {
        match self {
            Self::Press { button } => vec![button.clone()],
            Self::TypeDigits { digits } => digits
                .chars()
                .map(|c| ButtonRef::symbol(c.to_string()))
                .collect(),
        }
    }
}

/// Expected display value at a point in a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Arithmetic property being checked
    pub description: String,
    /// Expected normalized display value
    pub expected: String,
}

/// Step or checkpoint, in scenario order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Input
    Step(Step),
    /// Display assertion
    Check(Checkpoint),
}

/// Named, ordered sequence of steps and checkpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    name: String,
    actions: Vec<Action>,
}

impl Scenario {
    /// Start a scenario; the first action is always a clear press
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: vec![Action::Step(Step::Press {
                button: Key::Clear.button(),
            })],
        }
    }

    /// Activate a button
    #[must_use]
    pub fn press(mut self, button: impl Into<ButtonRef>) -> Self {
        self.actions.push(Action::Step(Step::Press {
            button: button.into(),
        }));
        self
    }

    /// Enter a digit string on the main keypad
    #[must_use]
    pub fn enter(mut self, digits: impl Into<String>) -> Self {
        self.actions.push(Action::Step(Step::TypeDigits {
            digits: digits.into(),
        }));
        self
    }

    /// Press a digit on the exponent popover keypad
    #[must_use]
    pub fn exponent_digit(self, digit: char) -> Self {
        self.press(ButtonRef::exponent_digit(digit))
    }

    /// Assert the display value at this point
    #[must_use]
    pub fn expect(mut self, description: impl Into<String>, expected: impl Into<String>) -> Self {
        self.actions.push(Action::Check(Checkpoint {
            description: description.into(),
            expected: expected.into(),
        }));
        self
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps and checkpoints in order
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Checkpoints in order
    pub fn checkpoints(&self) -> impl Iterator<Item = &Checkpoint> {
        self.actions.iter().filter_map(|a| match a {
            Action::Check(c) => Some(c),
            Action::Step(_) => None,
        })
    }

    /// Every individual press, with digit strings expanded
    #[must_use]
    pub fn presses(&self) -> Vec<ButtonRef> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Step(step) => Some(step.presses()),
                Action::Check(_) => None,
            })
            .flatten()
            .collect()
    }

    /// One line per checkpoint: the presses leading to it, then the
    /// expected value and what it checks
    #[must_use]
    pub fn outline(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for action in &self.actions {
            match action {
                Action::Step(step) => {
                    pending.extend(step.presses().iter().map(press_label));
                }
                Action::Check(c) => {
                    lines.push(format!(
                        "{} => {} ({})",
                        pending.join(" "),
                        c.expected,
                        c.description
                    ));
                    pending.clear();
                }
            }
        }
        lines
    }

    /// Check the scenario is runnable.
    ///
    /// # Errors
    ///
    /// [`HarnessError::InvalidScenario`] for an empty name, no checkpoint,
    /// an empty or whitespace-bearing digit string, or an expected value
    /// containing whitespace (it could never equal a normalized display).
    pub fn validate(&self) -> HarnessResult<()> {
        let invalid = |message: String| HarnessError::InvalidScenario {
            name: self.name.clone(),
            message,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if self.checkpoints().next().is_none() {
            return Err(invalid("no checkpoint".to_string()));
        }
        for action in &self.actions {
            match action {
                Action::Step(Step::TypeDigits { digits }) => {
                    if digits.is_empty() || digits.chars().any(char::is_whitespace) {
                        return Err(invalid(format!("bad digit string {digits:?}")));
                    }
                }
                Action::Check(c) => {
                    if c.expected.is_empty() || c.expected.chars().any(char::is_whitespace) {
                        return Err(invalid(format!(
                            "expected value {:?} of '{}' is not normalized",
                            c.expected, c.description
                        )));
                    }
                }
                Action::Step(Step::Press { .. }) => {}
            }
        }
        Ok(())
    }
}

fn press_label(button: &ButtonRef) -> String {
    match button {
        ButtonRef::Symbol {
            text,
            family: ButtonFamily::Round,
        } => text.clone(),
        ButtonRef::Symbol {
            text,
            family: ButtonFamily::ExponentKeypad,
        } => format!("^{text}"),
        ButtonRef::Id { identifier } => Key::from_id(identifier)
            .map_or_else(|| format!("#{identifier}"), |key| key.glyph().to_string()),
    }
}
