//! Reading the calculator's output field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keypad::{display_selector, DISPLAY_ATTRIBUTE};
use crate::locator::Selector;
use crate::result::{HarnessError, HarnessResult};
use crate::session::CalculatorSession;

/// Display text with all whitespace removed.
///
/// The widget groups digits with spaces (`"1 234"`); comparisons are exact
/// string equality after stripping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayValue(String);

impl DisplayValue {
    /// Normalize a raw display string
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self(raw.chars().filter(|c| !c.is_whitespace()).collect())
    }

    /// Normalized text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the normalized text
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for DisplayValue {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl PartialEq<str> for DisplayValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DisplayValue {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads the output field's current value
#[derive(Debug, Clone)]
pub struct DisplayReader {
    selector: Selector,
    attribute: String,
}

impl Default for DisplayReader {
    fn default() -> Self {
        Self {
            selector: display_selector(),
            attribute: DISPLAY_ATTRIBUTE.to_string(),
        }
    }
}

impl DisplayReader {
    /// Reader of the standard `input` field
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and normalize the display. No waiting: callers sequence this after
    /// an activation's settle delay.
    ///
    /// # Errors
    ///
    /// [`HarnessError::ElementUnreachable`] if the display is missing, or any
    /// session error.
    pub async fn read<S>(&self, session: &S) -> HarnessResult<DisplayValue>
    where
        S: CalculatorSession + ?Sized,
    {
        let element = session.find_matching(&self.selector).await?.ok_or_else(|| {
            HarnessError::ElementUnreachable {
                selector: self.selector.to_string(),
                cause: "display not present".to_string(),
            }
        })?;
        let raw = session
            .read_attribute(&element, &self.attribute)
            .await?
            .unwrap_or_default();
        let value = DisplayValue::normalize(&raw);
        tracing::debug!(raw = %raw, value = %value, "display read");
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::keypad::DISPLAY_ID;
    use crate::mock::MockSession;

    mod display_value_tests {
        use super::*;

        #[test]
        fn test_grouping_is_stripped() {
            assert_eq!(DisplayValue::normalize("1 234"), "1234");
            assert_eq!(DisplayValue::normalize(" 1 234 567\u{a0}890\n"), "1234567890");
        }

        #[test]
        fn test_sign_kept() {
            assert_eq!(DisplayValue::from("- 15"), "-15");
        }

        #[test]
        fn test_display_and_inner() {
            let value = DisplayValue::normalize("12 000");
            assert_eq!(value.to_string(), "12000");
            assert_eq!(value.into_inner(), "12000");
        }
    }

    mod reader_tests {
        use super::*;
        use crate::session::CalculatorSession;

        #[tokio::test]
        async fn test_reads_normalized_value() {
            let session = MockSession::new();
            for digit in ["1", "2", "3", "4"] {
                let el = session
                    .find_matching(&crate::locator::ButtonRef::symbol(digit).resolve())
                    .await
                    .unwrap()
                    .unwrap();
                session.trigger_activation(&el).await.unwrap();
            }
            assert_eq!(session.raw_display(), "1 234");
            let value = DisplayReader::new().read(&session).await.unwrap();
            assert_eq!(value, "1234");
        }

        #[tokio::test]
        async fn test_read_is_idempotent() {
            let session = MockSession::new();
            let reader = DisplayReader::new();
            let first = reader.read(&session).await.unwrap();
            let second = reader.read(&session).await.unwrap();
            assert_eq!(first, second);
            assert_eq!(first, "0");
        }

        #[tokio::test]
        async fn test_missing_display() {
            let session = MockSession::new().without(DISPLAY_ID);
            let err = DisplayReader::new().read(&session).await.unwrap_err();
            assert!(matches!(err, HarnessError::ElementUnreachable { .. }));
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalization_is_idempotent(raw in "[0-9 \\-\\t]{0,32}") {
                let once = DisplayValue::normalize(&raw);
                let twice = DisplayValue::normalize(once.as_str());
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn normalized_has_no_whitespace(raw in "\\PC{0,32}") {
                let value = DisplayValue::normalize(&raw);
                prop_assert!(!value.as_str().chars().any(char::is_whitespace));
            }

            #[test]
            fn grouping_matches_digits(n in 0u64..10_000_000_000) {
                let grouped = crate::mock::group_digits(&n.to_string());
                let expected = n.to_string();
                prop_assert_eq!(DisplayValue::normalize(&grouped), expected.as_str());
            }
        }
    }
}
