//! Suite configuration
//!
//! Layering order: built-in defaults, then an optional YAML file, then
//! environment (`BASE_URL`, `CI`), then whatever the caller overrides through
//! the `with_*` builders (the CLI maps its flags onto those).

use crate::result::{LeadformError, LeadformResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Deployed site used when `BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "https://test-qa.capslock.global";

/// Default auto-wait bound for expectations
pub const DEFAULT_EXPECT_TIMEOUT_MS: u64 = 5000;

/// Default settle window for "must not transition" checks
pub const DEFAULT_SETTLE_WINDOW_MS: u64 = 1500;

/// Default poll interval inside the settle window
pub const DEFAULT_SETTLE_INTERVAL_MS: u64 = 200;

/// Default bound for a slider transition to finish
pub const DEFAULT_SLIDER_TRANSITION_MS: u64 = 10_000;

/// Browser viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Configuration for one suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Root URL of the site under test
    pub base_url: String,
    /// Run the browser without a window
    pub headless: bool,
    /// Viewport size
    pub viewport: Viewport,
    /// Explicit chromium binary
    pub chromium_path: Option<PathBuf>,
    /// Disable the chromium sandbox (containers)
    pub no_sandbox: bool,
    /// Auto-wait bound for expectations
    pub expect_timeout_ms: u64,
    /// Poll interval for expectations
    pub expect_poll_interval_ms: u64,
    /// Settle window for stays-on-step checks
    pub settle_window_ms: u64,
    /// Poll interval inside the settle window
    pub settle_interval_ms: u64,
    /// Bound for a slider transition to finish
    pub slider_transition_ms: u64,
    /// Scenario-level retries for failed scenarios
    pub retries: u32,
    /// Scenarios in flight at once (each on its own session)
    pub workers: usize,
    /// Where JSON and JUnit reports are written
    pub report_dir: PathBuf,
    /// Capture a PNG under `report_dir/screenshots` when an attempt fails
    pub screenshot_on_failure: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            viewport: Viewport::default(),
            chromium_path: None,
            no_sandbox: false,
            expect_timeout_ms: DEFAULT_EXPECT_TIMEOUT_MS,
            expect_poll_interval_ms: 100,
            settle_window_ms: DEFAULT_SETTLE_WINDOW_MS,
            settle_interval_ms: DEFAULT_SETTLE_INTERVAL_MS,
            slider_transition_ms: DEFAULT_SLIDER_TRANSITION_MS,
            retries: 0,
            workers: available_workers(),
            report_dir: PathBuf::from("test-results"),
            screenshot_on_failure: true,
        }
    }
}

#[allow(clippy::redundant_closure_for_method_calls)]
fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl SuiteConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_from(|key| std::env::var(key).ok())
    }

    /// Load a YAML file; missing keys keep their defaults
    pub fn from_yaml_file(path: &Path) -> LeadformResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse YAML text; missing keys keep their defaults
    pub fn from_yaml_str(text: &str) -> LeadformResult<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> LeadformResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply `BASE_URL` and `CI` through an arbitrary lookup
    #[must_use]
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if lookup("CI").is_some_and(|v| !v.is_empty() && v != "0" && v != "false") {
            self.retries = 2;
            self.workers = 4;
        }
        self
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    /// Set chromium binary
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable the chromium sandbox
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.no_sandbox = true;
        self
    }

    /// Set expectation timeout
    #[must_use]
    pub const fn with_expect_timeout(mut self, ms: u64) -> Self {
        self.expect_timeout_ms = ms;
        self
    }

    /// Set settle window and interval
    #[must_use]
    pub const fn with_settle(mut self, window_ms: u64, interval_ms: u64) -> Self {
        self.settle_window_ms = window_ms;
        self.settle_interval_ms = interval_ms;
        self
    }

    /// Set scenario retries
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set worker count
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set report directory
    #[must_use]
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Enable or disable failure screenshots
    #[must_use]
    pub const fn with_screenshot_on_failure(mut self, enabled: bool) -> Self {
        self.screenshot_on_failure = enabled;
        self
    }

    /// Directory failure screenshots go to
    #[must_use]
    pub fn screenshot_dir(&self) -> PathBuf {
        self.report_dir.join("screenshots")
    }

    /// Expectation timeout
    #[must_use]
    pub const fn expect_timeout(&self) -> Duration {
        Duration::from_millis(self.expect_timeout_ms)
    }

    /// Expectation poll interval
    #[must_use]
    pub const fn expect_poll_interval(&self) -> Duration {
        Duration::from_millis(self.expect_poll_interval_ms)
    }

    /// Settle window
    #[must_use]
    pub const fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }

    /// Settle poll interval
    #[must_use]
    pub const fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }

    /// Slider transition bound
    #[must_use]
    pub const fn slider_transition(&self) -> Duration {
        Duration::from_millis(self.slider_transition_ms)
    }

    /// Absolute URL for a path on the site under test
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Reject settings no run could work with
    pub fn validate(&self) -> LeadformResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(LeadformError::config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.expect_poll_interval_ms == 0 || self.settle_interval_ms == 0 {
            return Err(LeadformError::config("poll intervals must be non-zero"));
        }
        if self.settle_interval_ms > self.settle_window_ms {
            return Err(LeadformError::config(format!(
                "settle interval {}ms exceeds settle window {}ms",
                self.settle_interval_ms, self.settle_window_ms
            )));
        }
        if self.workers == 0 {
            return Err(LeadformError::config("workers must be at least 1"));
        }
        Ok(())
    }
}
