//! Chromium sessions over the Chrome `DevTools` Protocol.
//!
//! [`BrowserConfig`] is always available so configs can be parsed without a
//! browser. With the `browser` feature, [`ChromiumProvider`] launches one
//! Chromium per session through chromiumoxide and opens the calculator page.

use serde::{Deserialize, Serialize};

/// Browser launch options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Suppress the notification permission prompt
    pub disable_notifications: bool,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            disable_notifications: true,
            sandbox: true,
            chromium_path: None,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Extra command line switches passed to Chromium
    #[must_use]
    pub fn extra_args(&self) -> Vec<&'static str> {
        let mut args = Vec::new();
        if self.disable_notifications {
            args.push("--disable-notifications");
        }
        args
    }
}

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::significant_drop_tightening)]
mod cdp {
    use super::BrowserConfig;
    use crate::locator::Selector;
    use crate::result::{HarnessError, HarnessResult};
    use crate::session::{CalculatorSession, SessionProvider};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::element::Element as CdpElement;
    use chromiumoxide::error::CdpError;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use tokio::sync::Mutex;

    const SCROLL_TO_CENTRE: &str =
        "function() { this.scrollIntoView({block: 'center', inline: 'center'}); }";

    const FORCE_CLICK: &str = "function() { this.click(); }";

    const IS_INTERACTABLE: &str = "function() {
        if (!this.isConnected) return false;
        const r = this.getBoundingClientRect();
        if (r.width === 0 || r.height === 0) return false;
        const s = window.getComputedStyle(this);
        if (s.visibility === 'hidden' || s.display === 'none' || s.pointerEvents === 'none') return false;
        if (this.disabled || this.getAttribute('aria-disabled') === 'true') return false;
        const hit = document.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2);
        return hit === this || this.contains(hit);
    }";

    fn classify(err: CdpError, selector: &str) -> HarnessError {
        match err {
            CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
                HarnessError::session(err.to_string())
            }
            other => HarnessError::interaction(selector, other.to_string()),
        }
    }

    /// Element handle remembering the selector it was found with
    #[derive(Debug)]
    pub struct ChromiumElement {
        inner: CdpElement,
        selector: String,
    }

    /// One Chromium instance showing the calculator
    #[derive(Debug)]
    pub struct ChromiumSession {
        browser: Mutex<CdpBrowser>,
        page: CdpPage,
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumSession {
        /// Launch Chromium and open `url`
        pub async fn launch(config: &BrowserConfig, url: &str) -> HarnessResult<Self> {
            let mut builder = CdpConfig::builder().window_size(config.window_width, config.window_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            for arg in config.extra_args() {
                builder = builder.arg(arg);
            }

            let cdp_config = builder.build().map_err(HarnessError::session)?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| HarnessError::session(format!("launch failed: {e}")))?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page(url)
                .await
                .map_err(|e| HarnessError::session(format!("cannot open {url}: {e}")))?;
            tracing::debug!(url, "page opened");

            Ok(Self {
                browser: Mutex::new(browser),
                page,
                handle,
            })
        }

        async fn count(&self, xpath: &str) -> HarnessResult<usize> {
            let expr = format!(
                "document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
                serde_json::to_string(xpath)?
            );
            let result = self
                .page
                .evaluate(expr)
                .await
                .map_err(|e| classify(e, xpath))?;
            result
                .into_value::<usize>()
                .map_err(|e| HarnessError::interaction(xpath, e.to_string()))
        }

        /// Close the browser and stop its event loop
        pub async fn shutdown(self) -> HarnessResult<()> {
            let mut browser = self.browser.lock().await;
            let closed = browser.close().await;
            let _ = browser.wait().await;
            self.handle.abort();
            closed
                .map(|_| ())
                .map_err(|e| HarnessError::session(format!("close failed: {e}")))
        }
    }

    #[async_trait]
    impl CalculatorSession for ChromiumSession {
        type Element = ChromiumElement;

        async fn find_matching(
            &self,
            selector: &Selector,
        ) -> HarnessResult<Option<ChromiumElement>> {
            Ok(self.find_all_matching(selector).await?.into_iter().next())
        }

        async fn find_all_matching(
            &self,
            selector: &Selector,
        ) -> HarnessResult<Vec<ChromiumElement>> {
            let xpath = selector.to_xpath();
            if self.count(&xpath).await? == 0 {
                return Ok(Vec::new());
            }
            let found = self
                .page
                .find_xpaths(xpath.as_str())
                .await
                .map_err(|e| classify(e, &xpath))?;
            Ok(found
                .into_iter()
                .map(|inner| ChromiumElement {
                    inner,
                    selector: xpath.clone(),
                })
                .collect())
        }

        async fn scroll_into_view(&self, element: &ChromiumElement) -> HarnessResult<()> {
            element
                .inner
                .call_js_fn(SCROLL_TO_CENTRE, false)
                .await
                .map_err(|e| classify(e, &element.selector))?;
            Ok(())
        }

        async fn is_interactable(&self, element: &ChromiumElement) -> HarnessResult<bool> {
            let returns = element
                .inner
                .call_js_fn(IS_INTERACTABLE, false)
                .await
                .map_err(|e| classify(e, &element.selector))?;
            Ok(returns
                .result
                .value
                .and_then(|v| v.as_bool())
                .unwrap_or(false))
        }

        async fn trigger_activation(&self, element: &ChromiumElement) -> HarnessResult<()> {
            element
                .inner
                .click()
                .await
                .map_err(|e| classify(e, &element.selector))?;
            Ok(())
        }

        async fn force_trigger_activation(&self, element: &ChromiumElement) -> HarnessResult<()> {
            element
                .inner
                .call_js_fn(FORCE_CLICK, false)
                .await
                .map_err(|e| classify(e, &element.selector))?;
            Ok(())
        }

        async fn read_attribute(
            &self,
            element: &ChromiumElement,
            name: &str,
        ) -> HarnessResult<Option<String>> {
            let property = element
                .inner
                .property(name)
                .await
                .map_err(|e| classify(e, &element.selector))?;
            match property {
                Some(serde_json::Value::String(s)) => Ok(Some(s)),
                Some(serde_json::Value::Null) | None => element
                    .inner
                    .attribute(name)
                    .await
                    .map_err(|e| classify(e, &element.selector)),
                Some(other) => Ok(Some(other.to_string())),
            }
        }
    }

    /// Launches a fresh Chromium per session
    #[derive(Debug, Clone)]
    pub struct ChromiumProvider {
        config: BrowserConfig,
        url: String,
    }

    impl ChromiumProvider {
        /// Provider opening `url` with the given launch options
        #[must_use]
        pub fn new(config: BrowserConfig, url: impl Into<String>) -> Self {
            Self {
                config,
                url: url.into(),
            }
        }
    }

    #[async_trait]
    impl SessionProvider for ChromiumProvider {
        type Session = ChromiumSession;

        async fn open(&self) -> HarnessResult<ChromiumSession> {
            ChromiumSession::launch(&self.config, &self.url).await
        }

        async fn close(&self, session: ChromiumSession) -> HarnessResult<()> {
            session.shutdown().await
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumElement, ChromiumProvider, ChromiumSession};
