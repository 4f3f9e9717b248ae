//! Calcprobe: acceptance harness for a web calculator widget
//!
//! Drives the calculator through a browser session, pressing buttons the way a
//! user would and checking the display after each computation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌──────────────────┐
//! │ Catalog  │──►│ Runner   │──►│ Activator │──►│ CalculatorSession│
//! │(Scenario)│   │ (Harness)│   │ + Display │   │ (chromium / mock)│
//! └──────────┘   └──────────┘   └───────────┘   └──────────────────┘
//! ```
//!
//! Every control press goes through the [`Activator`]: a bounded wait for the
//! control to become interactable, falling back to a forced programmatic
//! activation when the page is still animating or something overlays it.
//!
//! # Example
//!
//! ```no_run
//! use calcprobe::prelude::*;
//!
//! # async fn demo() {
//! let harness = Harness::new(&HarnessConfig::default());
//! let report = harness.run_suite(&MockProvider::new(), &catalog()).await;
//! assert!(report.all_passed());
//! # }
//! ```

#![warn(missing_docs)]

mod activator;
#[allow(clippy::missing_errors_doc)]
mod browser;
pub mod catalog;
mod config;
mod display;
pub mod keypad;
mod locator;
pub mod mock;
mod report;
mod result;
mod runner;
mod scenario;
mod session;
mod wait;

pub use activator::{ActivationConfig, Activator, InteractionOutcome, DEFAULT_SETTLE_MS};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{ChromiumElement, ChromiumProvider, ChromiumSession};
pub use catalog::catalog;
pub use config::{HarnessConfig, DEFAULT_READINESS_TIMEOUT_MS, DEFAULT_URL};
pub use display::{DisplayReader, DisplayValue};
pub use keypad::Key;
pub use locator::{
    normalize_text, resolve, xpath_literal, ButtonFamily, ButtonRef, Selector,
    EXPONENT_KEYPAD_CLASS, ROUND_BUTTON_CLASS,
};
pub use report::{ScenarioFailure, ScenarioReport, SuiteReport};
pub use result::{HarnessError, HarnessResult};
pub use runner::{Harness, Silent, SuiteObserver};
pub use scenario::{Action, Checkpoint, Scenario, Step};
pub use session::{CalculatorSession, SessionProvider};
pub use wait::{
    wait_for_element, ElementState, WaitOptions, DEFAULT_INTERACTABLE_TIMEOUT_MS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_PRESENCE_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::catalog::catalog;
    pub use super::mock::{MockProvider, MockSession};
    pub use super::{
        ActivationConfig, Activator, ButtonRef, CalculatorSession, DisplayReader, DisplayValue,
        Harness, HarnessConfig, HarnessError, HarnessResult, InteractionOutcome, Key, Scenario,
        ScenarioReport, Selector, SessionProvider, SuiteReport,
    };
    #[cfg(feature = "browser")]
    pub use super::ChromiumProvider;
}
