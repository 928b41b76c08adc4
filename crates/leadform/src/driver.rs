//! BrowserDriver - the automation seam
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  BrowserDriver (async trait, &self everywhere)                    │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────┐   ┌──────────────────────────────┐ │
//! │  │  ChromiumDriver          │   │  MockDriver<P: VirtualPage>  │ │
//! │  │  (feature = "browser")   │   │  (always available)          │ │
//! │  │  CDP via chromiumoxide   │   │  snapshots of a simulated    │ │
//! │  │  + in-page resolver      │   │  site, call history          │ │
//! │  └──────────────────────────┘   └──────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Page objects hold an `Arc<dyn BrowserDriver>` so one scenario owns one
//! session, and a [`SessionFactory`] hands each scenario a fresh one.
//!
//! Query semantics: `is_visible` and `count` tolerate zero matches; the other
//! single-element queries and every action fail with `ElementNotFound`.
//! Strict locators matching more than one element are a driver error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::locator::Locator;
use crate::result::LeadformResult;

/// Browser automation primitives consumed by the page objects
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate to an absolute URL and wait for load
    async fn goto(&self, url: &str) -> LeadformResult<()>;

    /// Current page URL
    async fn current_url(&self) -> LeadformResult<String>;

    /// Number of matching elements
    async fn count(&self, locator: &Locator) -> LeadformResult<usize>;

    /// Whether the element is rendered; `false` when nothing matches
    async fn is_visible(&self, locator: &Locator) -> LeadformResult<bool>;

    /// Whether the element accepts input
    async fn is_enabled(&self, locator: &Locator) -> LeadformResult<bool>;

    /// Checked state of a checkbox/radio (or the control a label points at)
    async fn is_checked(&self, locator: &Locator) -> LeadformResult<bool>;

    /// Current value of an input
    async fn input_value(&self, locator: &Locator) -> LeadformResult<String>;

    /// Normalized text content
    async fn text_content(&self, locator: &Locator) -> LeadformResult<String>;

    /// Attribute value, `None` when absent
    async fn attribute(&self, locator: &Locator, name: &str) -> LeadformResult<Option<String>>;

    /// Computed style property
    async fn computed_style(&self, locator: &Locator, property: &str) -> LeadformResult<String>;

    /// Replace the value of a text input as if typed
    async fn fill(&self, locator: &Locator, value: &str) -> LeadformResult<()>;

    /// Click the element
    async fn click(&self, locator: &Locator) -> LeadformResult<()>;

    /// Ensure a checkbox/radio is checked (no-op when already checked)
    async fn check(&self, locator: &Locator) -> LeadformResult<()>;

    /// Assign `value` directly and dispatch bubbling `input`, `change` and `blur`
    async fn set_value_with_events(&self, locator: &Locator, value: &str) -> LeadformResult<()>;

    /// PNG capture of the page
    async fn screenshot(&self) -> LeadformResult<Vec<u8>>;

    /// Release the session
    async fn close(&self) -> LeadformResult<()>;
}

/// Shared handle to a driver
pub type SharedDriver = Arc<dyn BrowserDriver>;

/// Opens one isolated session per scenario
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a fresh session
    async fn open(&self) -> LeadformResult<SharedDriver>;

    /// Tear down shared resources after the run
    async fn shutdown(&self) -> LeadformResult<()> {
        Ok(())
    }
}
