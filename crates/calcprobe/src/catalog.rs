//! Acceptance scenarios for the calculator widget.

use crate::keypad::Key;
use crate::scenario::Scenario;

/// Every digit entered in order shows up verbatim
#[must_use]
pub fn all_digits_input() -> Scenario {
    Scenario::new("all_digits_input")
        .enter("1234567890")
        .expect("all ten digits are entered", "1234567890")
}

/// Subtraction below zero and operator precedence on a negative product
#[must_use]
pub fn negative_numbers() -> Scenario {
    Scenario::new("negative_numbers")
        .enter("10")
        .press(Key::Minus)
        .enter("25")
        .press(Key::Equal)
        .expect("subtracting past zero goes negative", "-15")
        .press(Key::Clear)
        .enter("0")
        .press(Key::Minus)
        .enter("5")
        .press(Key::Multiply)
        .enter("3")
        .press(Key::Equal)
        .expect("multiplication binds tighter than a leading subtraction", "-15")
}

/// Square root, factorial, percentage and exponent keypad
#[must_use]
pub fn advanced_functions() -> Scenario {
    Scenario::new("advanced_functions")
        .press(Key::Root)
        .enter("16")
        .press(Key::Equal)
        .expect("square root of 16", "4")
        .press(Key::Clear)
        .enter("5")
        .press(Key::Factorial)
        .press(Key::Equal)
        .expect("factorial of 5", "120")
        .press(Key::Clear)
        .enter("200")
        .press(Key::Multiply)
        .enter("50")
        .press(Key::Percent)
        .press(Key::Equal)
        .expect("50 percent of 200", "100")
        .press(Key::Clear)
        .enter("2")
        .press(Key::Exponent)
        .exponent_digit('3')
        .press(Key::Confirm)
        .press(Key::Equal)
        .expect("2 raised to 3 via the exponent keypad", "8")
}

/// Full acceptance suite in run order
#[must_use]
pub fn catalog() -> Vec<Scenario> {
    vec![all_digits_input(), negative_numbers(), advanced_functions()]
}

/// Scenarios whose name contains `filter` (all when `None`)
#[must_use]
pub fn select(filter: Option<&str>) -> Vec<Scenario> {
    catalog()
        .into_iter()
        .filter(|s| filter.map_or(true, |f| s.name().contains(f)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::ButtonRef;
    use crate::mock::Calculator;
    use crate::scenario::{Action, Step};

    /// Replay a scenario straight against the calculator model
    fn replay(scenario: &Scenario) -> Vec<(String, String)> {
        let mut calc = Calculator::new();
        let mut seen = Vec::new();
        for action in scenario.actions() {
            match action {
                Action::Step(step) => {
                    for press in step.presses() {
                        match press {
                            ButtonRef::Id { identifier } => {
                                calc.press(Key::from_id(&identifier).unwrap_or(Key::Clear));
                            }
                            ButtonRef::Symbol { text, family } => {
                                let c = text.chars().next().unwrap_or('0');
                                match family {
                                    crate::locator::ButtonFamily::Round => calc.press_digit(c),
                                    crate::locator::ButtonFamily::ExponentKeypad => {
                                        calc.press_exponent_digit(c);
                                    }
                                }
                            }
                        }
                    }
                }
                Action::Check(c) => {
                    let shown: String = calc
                        .display()
                        .chars()
                        .filter(|c| !c.is_whitespace())
                        .collect();
                    seen.push((c.expected.clone(), shown));
                }
            }
        }
        seen
    }

    #[test]
    fn test_catalog_order_and_names() {
        let names: Vec<_> = catalog().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(
            names,
            ["all_digits_input", "negative_numbers", "advanced_functions"]
        );
    }

    #[test]
    fn test_all_valid() {
        for scenario in catalog() {
            assert!(scenario.validate().is_ok(), "{}", scenario.name());
        }
    }

    #[test]
    fn test_checkpoint_counts() {
        let counts: Vec<_> = catalog().iter().map(|s| s.checkpoints().count()).collect();
        assert_eq!(counts, [1, 2, 4]);
    }

    #[test]
    fn test_every_scenario_starts_cleared() {
        for scenario in catalog() {
            assert_eq!(
                scenario.actions()[0],
                Action::Step(Step::Press {
                    button: Key::Clear.button()
                })
            );
        }
    }

    #[test]
    fn test_expectations_hold_on_model() {
        for scenario in catalog() {
            for (expected, shown) in replay(&scenario) {
                assert_eq!(expected, shown, "{}", scenario.name());
            }
        }
    }

    #[test]
    fn test_select() {
        assert_eq!(select(None).len(), 3);
        let picked = select(Some("negative"));
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name(), "negative_numbers");
        assert!(select(Some("nothing")).is_empty());
    }
}
