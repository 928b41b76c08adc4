//! MockDriver: a `BrowserDriver` over an in-process page model

use std::sync::Mutex;

use async_trait::async_trait;

use super::snapshot::ElementSnapshot;
use crate::driver::BrowserDriver;
use crate::locator::Locator;
use crate::result::{LeadformError, LeadformResult};

/// A page the mock driver can observe and act on.
///
/// `elements` and `url` are called for every query, so implementations may
/// apply time-based state changes in either.
pub trait VirtualPage: Send {
    /// Current URL
    fn url(&mut self) -> String;

    /// Load a URL
    fn navigate(&mut self, url: &str) -> LeadformResult<()>;

    /// Current elements in document order
    fn elements(&mut self) -> Vec<ElementSnapshot>;

    /// Type into the element with `key`
    fn fill(&mut self, key: &str, value: &str) -> LeadformResult<()>;

    /// Click the element with `key`
    fn click(&mut self, key: &str) -> LeadformResult<()>;

    /// Script-assign a value and fire input/change/blur
    fn set_value_with_events(&mut self, key: &str, value: &str) -> LeadformResult<()> {
        self.fill(key, value)
    }
}

/// Bytes `MockDriver::screenshot` returns unless replaced (the PNG signature)
pub const PLACEHOLDER_PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Mock driver for unit and integration tests
#[derive(Debug)]
pub struct MockDriver<P> {
    page: Mutex<P>,
    call_history: Mutex<Vec<String>>,
    screenshot_data: Vec<u8>,
}

impl<P: VirtualPage> MockDriver<P> {
    /// Wrap a page
    #[must_use]
    pub fn new(page: P) -> Self {
        Self {
            page: Mutex::new(page),
            call_history: Mutex::new(Vec::new()),
            screenshot_data: PLACEHOLDER_PNG.to_vec(),
        }
    }

    /// Set the bytes returned by `screenshot`
    #[must_use]
    pub fn with_screenshot(mut self, data: Vec<u8>) -> Self {
        self.screenshot_data = data;
        self
    }

    /// Recorded calls, e.g. `fill:<locator>=<value>`
    #[must_use]
    pub fn call_history(&self) -> Vec<String> {
        self.call_history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Whether a method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history()
            .iter()
            .any(|c| c.split(':').next() == Some(method))
    }

    /// Run a closure against the page (test setup and inspection)
    pub fn with_page<R>(&self, f: impl FnOnce(&mut P) -> R) -> LeadformResult<R> {
        let mut page = self.lock_page()?;
        Ok(f(&mut page))
    }

    fn record(&self, call: String) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(call);
        }
    }

    fn lock_page(&self) -> LeadformResult<std::sync::MutexGuard<'_, P>> {
        self.page
            .lock()
            .map_err(|_| LeadformError::driver("mock page lock poisoned"))
    }

    fn resolve_one(page: &mut P, locator: &Locator) -> LeadformResult<ElementSnapshot> {
        let elements = page.elements();
        let hits = locator.resolve(&elements);
        match hits.as_slice() {
            [] => Err(LeadformError::ElementNotFound {
                locator: locator.to_string(),
            }),
            [only] => Ok(elements[*only].clone()),
            [first, ..] if !locator.is_strict() => Ok(elements[*first].clone()),
            many => Err(LeadformError::driver(format!(
                "strict mode violation: {locator} resolved to {} elements",
                many.len()
            ))),
        }
    }

    fn actionable(page: &mut P, locator: &Locator) -> LeadformResult<ElementSnapshot> {
        let el = Self::resolve_one(page, locator)?;
        if !el.visible {
            return Err(LeadformError::ElementNotInteractable {
                locator: locator.to_string(),
                reason: "element is not visible".to_string(),
            });
        }
        if !el.enabled {
            return Err(LeadformError::ElementNotInteractable {
                locator: locator.to_string(),
                reason: "element is disabled".to_string(),
            });
        }
        Ok(el)
    }

    fn query<R>(
        &self,
        locator: &Locator,
        f: impl FnOnce(&ElementSnapshot) -> R,
    ) -> LeadformResult<R> {
        let mut page = self.lock_page()?;
        let el = Self::resolve_one(&mut page, locator)?;
        Ok(f(&el))
    }
}

#[async_trait]
impl<P: VirtualPage> BrowserDriver for MockDriver<P> {
    async fn goto(&self, url: &str) -> LeadformResult<()> {
        self.record(format!("goto:{url}"));
        self.lock_page()?.navigate(url)
    }

    async fn current_url(&self) -> LeadformResult<String> {
        Ok(self.lock_page()?.url())
    }

    async fn count(&self, locator: &Locator) -> LeadformResult<usize> {
        let mut page = self.lock_page()?;
        let elements = page.elements();
        Ok(locator.resolve(&elements).len())
    }

    async fn is_visible(&self, locator: &Locator) -> LeadformResult<bool> {
        let mut page = self.lock_page()?;
        match Self::resolve_one(&mut page, locator) {
            Ok(el) => Ok(el.visible),
            Err(LeadformError::ElementNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn is_enabled(&self, locator: &Locator) -> LeadformResult<bool> {
        self.query(locator, |el| el.enabled)
    }

    async fn is_checked(&self, locator: &Locator) -> LeadformResult<bool> {
        self.query(locator, |el| el.checked)
    }

    async fn input_value(&self, locator: &Locator) -> LeadformResult<String> {
        self.query(locator, |el| el.value.clone())
    }

    async fn text_content(&self, locator: &Locator) -> LeadformResult<String> {
        self.query(locator, |el| el.text.clone())
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> LeadformResult<Option<String>> {
        self.query(locator, |el| el.node.attribute(name))
    }

    async fn computed_style(&self, locator: &Locator, property: &str) -> LeadformResult<String> {
        self.query(locator, |el| {
            el.styles.get(property).cloned().unwrap_or_default()
        })
    }

    async fn fill(&self, locator: &Locator, value: &str) -> LeadformResult<()> {
        self.record(format!("fill:{locator}={value}"));
        let mut page = self.lock_page()?;
        let el = Self::actionable(&mut page, locator)?;
        page.fill(el.action_target(), value)
    }

    async fn click(&self, locator: &Locator) -> LeadformResult<()> {
        self.record(format!("click:{locator}"));
        let mut page = self.lock_page()?;
        let el = Self::actionable(&mut page, locator)?;
        page.click(&el.key)
    }

    async fn check(&self, locator: &Locator) -> LeadformResult<()> {
        self.record(format!("check:{locator}"));
        let mut page = self.lock_page()?;
        let el = Self::actionable(&mut page, locator)?;
        if el.checked {
            return Ok(());
        }
        page.click(el.action_target())?;
        if Self::resolve_one(&mut page, locator)?.checked {
            Ok(())
        } else {
            Err(LeadformError::driver(format!(
                "clicking {locator} did not check it"
            )))
        }
    }

    async fn set_value_with_events(&self, locator: &Locator, value: &str) -> LeadformResult<()> {
        self.record(format!("set_value:{locator}={value}"));
        let mut page = self.lock_page()?;
        let el = Self::resolve_one(&mut page, locator)?;
        page.set_value_with_events(el.action_target(), value)
    }

    async fn screenshot(&self) -> LeadformResult<Vec<u8>> {
        self.record("screenshot".to_string());
        Ok(self.screenshot_data.clone())
    }

    async fn close(&self) -> LeadformResult<()> {
        self.record("close".to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::locator::AriaRole;

    /// One text box, one checkbox with a label, one disabled button
    #[derive(Debug, Default)]
    struct TinyPage {
        url: String,
        text: String,
        agreed: bool,
    }

    impl VirtualPage for TinyPage {
        fn url(&mut self) -> String {
            self.url.clone()
        }

        fn navigate(&mut self, url: &str) -> LeadformResult<()> {
            self.url = url.to_string();
            Ok(())
        }

        fn elements(&mut self) -> Vec<ElementSnapshot> {
            vec![
                ElementSnapshot::new("box", "input")
                    .with_role(AriaRole::Textbox, "Comment")
                    .with_value(&self.text),
                ElementSnapshot::new("agree", "input")
                    .with_attr("type", "checkbox")
                    .with_role(AriaRole::Checkbox, "Agree")
                    .checked(self.agreed),
                ElementSnapshot::new("agree-label", "label")
                    .with_text("I agree")
                    .labelling("agree")
                    .checked(self.agreed),
                ElementSnapshot::new("send", "button")
                    .with_role(AriaRole::Button, "Send")
                    .disabled(),
                ElementSnapshot::new("item-a", "li").with_text("item"),
                ElementSnapshot::new("item-b", "li").with_text("item"),
            ]
        }

        fn fill(&mut self, key: &str, value: &str) -> LeadformResult<()> {
            if key == "box" {
                self.text = value.to_string();
            }
            Ok(())
        }

        fn click(&mut self, key: &str) -> LeadformResult<()> {
            if key == "agree" {
                self.agreed = !self.agreed;
            }
            Ok(())
        }
    }

    mod query_tests {
        use super::*;

        #[tokio::test]
        async fn test_is_visible_tolerates_no_match() {
            let driver = MockDriver::new(TinyPage::default());
            let missing = Locator::new("#nope");
            assert!(!driver.is_visible(&missing).await.unwrap());
            assert_eq!(driver.count(&missing).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_value_query_requires_match() {
            let driver = MockDriver::new(TinyPage::default());
            let err = driver.input_value(&Locator::new("#nope")).await.unwrap_err();
            assert!(matches!(err, LeadformError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_strict_violation() {
            let driver = MockDriver::new(TinyPage::default());
            let items = Locator::new("li");
            let err = driver.text_content(&items).await.unwrap_err();
            assert!(err.to_string().contains("strict mode violation"));
            assert_eq!(driver.text_content(&items.nth(1)).await.unwrap(), "item");
        }

        #[tokio::test]
        async fn test_visibility_of_ambiguous_strict_locator_is_error() {
            let driver = MockDriver::new(TinyPage::default());
            let items = Locator::new("li");
            let err = driver.is_visible(&items).await.unwrap_err();
            assert!(err.to_string().contains("strict mode violation"));
            assert!(driver.is_visible(&items.nth(0)).await.unwrap());
        }

        #[tokio::test]
        async fn test_screenshot_placeholder_and_override() {
            let driver = MockDriver::new(TinyPage::default());
            assert_eq!(driver.screenshot().await.unwrap(), PLACEHOLDER_PNG);
            assert!(driver.was_called("screenshot"));

            let driver = MockDriver::new(TinyPage::default()).with_screenshot(vec![1, 2, 3]);
            assert_eq!(driver.screenshot().await.unwrap(), vec![1, 2, 3]);
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_and_history() {
            let driver = MockDriver::new(TinyPage::default());
            let comment = Locator::role(AriaRole::Textbox, "comment").unwrap();
            driver.fill(&comment, "hello").await.unwrap();
            assert_eq!(driver.input_value(&comment).await.unwrap(), "hello");
            assert!(driver.was_called("fill"));
            assert!(!driver.was_called("click"));
        }

        #[tokio::test]
        async fn test_check_through_label_is_idempotent() {
            let driver = MockDriver::new(TinyPage::default());
            let label = Locator::text("i agree").unwrap();
            driver.check(&label).await.unwrap();
            driver.check(&label).await.unwrap();
            assert!(driver.is_checked(&label).await.unwrap());
            assert!(driver.with_page(|p| p.agreed).unwrap());
        }

        #[tokio::test]
        async fn test_disabled_click_is_not_interactable() {
            let driver = MockDriver::new(TinyPage::default());
            let send = Locator::role(AriaRole::Button, "send").unwrap();
            let err = driver.click(&send).await.unwrap_err();
            assert!(matches!(err, LeadformError::ElementNotInteractable { .. }));
        }

        #[tokio::test]
        async fn test_goto_updates_url() {
            let driver = MockDriver::new(TinyPage::default());
            driver.goto("https://site.test/").await.unwrap();
            assert_eq!(driver.current_url().await.unwrap(), "https://site.test/");
            assert!(driver.was_called("goto"));
        }
    }
}
