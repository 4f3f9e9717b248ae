//! Harness configuration, loadable from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activator::{ActivationConfig, DEFAULT_SETTLE_MS};
use crate::browser::BrowserConfig;
use crate::result::{HarnessError, HarnessResult};
use crate::wait::{
    WaitOptions, DEFAULT_INTERACTABLE_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_PRESENCE_TIMEOUT_MS,
};

/// Address of the calculator under test
pub const DEFAULT_URL: &str = "https://x-calculator.ru/";

/// Default budget for the page to show its display (10 seconds)
pub const DEFAULT_READINESS_TIMEOUT_MS: u64 = 10_000;

/// Everything a suite run needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Page hosting the calculator
    pub url: String,
    /// Presence wait budget per activation
    pub presence_timeout_ms: u64,
    /// Interactability wait budget per activation
    pub interactable_timeout_ms: u64,
    /// Polling interval of bounded waits
    pub poll_interval_ms: u64,
    /// Delay after each activation
    pub settle_ms: u64,
    /// Budget for the display to appear after the page opens
    pub readiness_timeout_ms: u64,
    /// Browser launch options
    pub browser: BrowserConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            presence_timeout_ms: DEFAULT_PRESENCE_TIMEOUT_MS,
            interactable_timeout_ms: DEFAULT_INTERACTABLE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            readiness_timeout_ms: DEFAULT_READINESS_TIMEOUT_MS,
            browser: BrowserConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a YAML file; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated
    pub fn from_yaml_file(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Parse from YAML text
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a valid config
    pub fn from_yaml_str(text: &str) -> HarnessResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that cannot drive a run
    ///
    /// # Errors
    ///
    /// [`HarnessError::Config`] describing the first problem found
    pub fn validate(&self) -> HarnessResult<()> {
        if !(self.url.starts_with("http://")
            || self.url.starts_with("https://")
            || self.url.starts_with("file://"))
        {
            return Err(HarnessError::Config {
                message: format!("url must be http(s) or file, got {:?}", self.url),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(HarnessError::Config {
                message: "poll_interval_ms must be positive".to_string(),
            });
        }
        if self.browser.window_width == 0 || self.browser.window_height == 0 {
            return Err(HarnessError::Config {
                message: "browser window must have a non-zero size".to_string(),
            });
        }
        Ok(())
    }

    /// Set the URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the settle delay
    #[must_use]
    pub const fn with_settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    /// Set the presence wait budget
    #[must_use]
    pub const fn with_presence_timeout_ms(mut self, ms: u64) -> Self {
        self.presence_timeout_ms = ms;
        self
    }

    /// Set the interactability wait budget
    #[must_use]
    pub const fn with_interactable_timeout_ms(mut self, ms: u64) -> Self {
        self.interactable_timeout_ms = ms;
        self
    }

    /// Set the readiness budget
    #[must_use]
    pub const fn with_readiness_timeout_ms(mut self, ms: u64) -> Self {
        self.readiness_timeout_ms = ms;
        self
    }

    /// Set the browser options
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Activation timing
    #[must_use]
    pub const fn activation(&self) -> ActivationConfig {
        ActivationConfig {
            presence_timeout_ms: self.presence_timeout_ms,
            interactable_timeout_ms: self.interactable_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
            settle_ms: self.settle_ms,
        }
    }

    /// Readiness gate wait
    #[must_use]
    pub fn readiness(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.readiness_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }
}
