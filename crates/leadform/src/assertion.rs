//! Auto-waiting expectations
//!
//! `expect(...).to_be_visible()` style checks that poll the page until the
//! condition holds or the bound (5s by default) runs out. A missing element
//! counts as "not yet" while polling; any other driver error ends the wait.

use std::fmt;
use std::sync::Mutex;

use crate::driver::BrowserDriver;
use crate::locator::{Locator, TextPattern};
use crate::result::{LeadformError, LeadformResult};
use crate::wait::{poll_until, WaitOptions};

/// Condition on a located element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Rendered
    Visible,
    /// Not rendered or absent
    Hidden,
    /// Accepts input
    Enabled,
    /// Checked state
    Checked(bool),
    /// Exact input value
    Value(String),
    /// Input value matches a pattern
    ValueMatching(TextPattern),
    /// Attribute equals a value
    Attribute {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// Computed style equals a value
    Css {
        /// Property name
        property: String,
        /// Expected value
        value: String,
    },
    /// Text content matches a pattern
    ContainsText(TextPattern),
    /// Number of matches
    Count(usize),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => f.write_str("be visible"),
            Self::Hidden => f.write_str("be hidden"),
            Self::Enabled => f.write_str("be enabled"),
            Self::Checked(true) => f.write_str("be checked"),
            Self::Checked(false) => f.write_str("not be checked"),
            Self::Value(v) => write!(f, "have value {v:?}"),
            Self::ValueMatching(p) => write!(f, "have value matching {p}"),
            Self::Attribute { name, value } => write!(f, "have {name}={value:?}"),
            Self::Css { property, value } => write!(f, "have css {property}: {value}"),
            Self::ContainsText(p) => write!(f, "contain text {p}"),
            Self::Count(n) => write!(f, "match {n} element(s)"),
        }
    }
}

/// Evaluate a condition once: `(passed, observed)`
pub async fn check_condition(
    driver: &dyn BrowserDriver,
    locator: &Locator,
    condition: &Condition,
) -> LeadformResult<(bool, String)> {
    let probe = async {
        Ok(match condition {
            Condition::Visible => {
                let v = driver.is_visible(locator).await?;
                (v, if v { "visible" } else { "hidden" }.to_string())
            }
            Condition::Hidden => {
                let v = driver.is_visible(locator).await?;
                (!v, if v { "visible" } else { "hidden" }.to_string())
            }
            Condition::Enabled => {
                let v = driver.is_enabled(locator).await?;
                (v, if v { "enabled" } else { "disabled" }.to_string())
            }
            Condition::Checked(expected) => {
                let v = driver.is_checked(locator).await?;
                (v == *expected, if v { "checked" } else { "unchecked" }.to_string())
            }
            Condition::Value(expected) => {
                let v = driver.input_value(locator).await?;
                (v == *expected, format!("value {v:?}"))
            }
            Condition::ValueMatching(pattern) => {
                let v = driver.input_value(locator).await?;
                (pattern.is_match(&v), format!("value {v:?}"))
            }
            Condition::Attribute { name, value } => {
                let v = driver.attribute(locator, name).await?;
                (v.as_deref() == Some(value.as_str()), format!("{name}={v:?}"))
            }
            Condition::Css { property, value } => {
                let v = driver.computed_style(locator, property).await?;
                (v == *value, format!("{property}: {v}"))
            }
            Condition::ContainsText(pattern) => {
                let v = driver.text_content(locator).await?;
                (pattern.is_match(&v), format!("text {v:?}"))
            }
            Condition::Count(expected) => {
                let n = driver.count(locator).await?;
                (n == *expected, format!("{n} element(s)"))
            }
        })
    };
    match probe.await {
        Err(LeadformError::ElementNotFound { .. }) => Ok((false, "no element".to_string())),
        other => other,
    }
}

/// Entry point for expectations against one session
#[derive(Clone, Copy)]
pub struct Expect<'a> {
    driver: &'a dyn BrowserDriver,
    options: WaitOptions,
}

impl fmt::Debug for Expect<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expect")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Expect<'a> {
    /// Expectations bounded by `options`
    #[must_use]
    pub const fn new(driver: &'a dyn BrowserDriver, options: WaitOptions) -> Self {
        Self { driver, options }
    }

    /// Same driver, different bound
    #[must_use]
    pub const fn with_options(self, options: WaitOptions) -> Self {
        Self::new(self.driver, options)
    }

    /// Expectations on an element
    #[must_use]
    pub const fn that(&self, locator: &'a Locator) -> LocatorExpect<'a> {
        LocatorExpect {
            driver: self.driver,
            locator,
            options: self.options,
        }
    }

    /// Wait until the URL matches `pattern`
    pub async fn url_to_match(&self, pattern: &TextPattern) -> LeadformResult<String> {
        self.url_condition(pattern, true).await
    }

    /// Wait until the URL does not match `pattern`
    pub async fn url_not_to_match(&self, pattern: &TextPattern) -> LeadformResult<String> {
        self.url_condition(pattern, false).await
    }

    async fn url_condition(&self, pattern: &TextPattern, expected: bool) -> LeadformResult<String> {
        let last = Mutex::new(String::new());
        let driver = self.driver;
        let seen = &last;
        let result = poll_until(self.options, "url", move || async move {
            let url = driver.current_url().await?;
            let ok = pattern.is_match(&url) == expected;
            set_observed(seen, url.clone());
            Ok(ok.then_some(url))
        })
        .await;
        result.map_err(|e| match e {
            LeadformError::Timeout { ms, .. } => LeadformError::Timeout {
                ms,
                waited_for: format!(
                    "url to {} {pattern} (last observed {:?})",
                    if expected { "match" } else { "not match" },
                    take_observed(&last)
                ),
            },
            other => other,
        })
    }
}

fn set_observed(slot: &Mutex<String>, value: String) {
    if let Ok(mut guard) = slot.lock() {
        *guard = value;
    }
}

fn take_observed(slot: &Mutex<String>) -> String {
    slot.lock().map(|g| g.clone()).unwrap_or_default()
}

/// Expectations on one locator
#[derive(Clone, Copy)]
pub struct LocatorExpect<'a> {
    driver: &'a dyn BrowserDriver,
    locator: &'a Locator,
    options: WaitOptions,
}

impl fmt::Debug for LocatorExpect<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocatorExpect")
            .field("locator", &self.locator)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl LocatorExpect<'_> {
    /// Poll until `condition` holds
    pub async fn to_satisfy(&self, condition: Condition) -> LeadformResult<()> {
        let observed = Mutex::new(String::from("nothing"));
        let (driver, locator) = (self.driver, self.locator);
        let (seen, cond) = (&observed, &condition);
        let result = poll_until(self.options, "condition", move || async move {
            let (ok, now) = check_condition(driver, locator, cond).await?;
            set_observed(seen, now);
            Ok(ok.then_some(()))
        })
        .await;
        result.map_err(|e| match e {
            LeadformError::Timeout { ms, .. } => LeadformError::Timeout {
                ms,
                waited_for: format!(
                    "{locator} to {condition} (last observed {})",
                    take_observed(&observed)
                ),
            },
            other => other,
        })
    }

    /// Visible
    pub async fn to_be_visible(&self) -> LeadformResult<()> {
        self.to_satisfy(Condition::Visible).await
    }

    /// Hidden or absent
    pub async fn to_be_hidden(&self) -> LeadformResult<()> {
        self.to_satisfy(Condition::Hidden).await
    }

    /// Enabled
    pub async fn to_be_enabled(&self) -> LeadformResult<()> {
        self.to_satisfy(Condition::Enabled).await
    }

    /// Checked
    pub async fn to_be_checked(&self) -> LeadformResult<()> {
        self.to_satisfy(Condition::Checked(true)).await
    }

    /// Not checked
    pub async fn not_to_be_checked(&self) -> LeadformResult<()> {
        self.to_satisfy(Condition::Checked(false)).await
    }

    /// Input value equals `value`
    pub async fn to_have_value(&self, value: &str) -> LeadformResult<()> {
        self.to_satisfy(Condition::Value(value.to_string())).await
    }

    /// Input value matches `pattern`
    pub async fn to_have_value_matching(&self, pattern: TextPattern) -> LeadformResult<()> {
        self.to_satisfy(Condition::ValueMatching(pattern)).await
    }

    /// Attribute equals `value`
    pub async fn to_have_attribute(&self, name: &str, value: &str) -> LeadformResult<()> {
        self.to_satisfy(Condition::Attribute {
            name: name.to_string(),
            value: value.to_string(),
        })
        .await
    }

    /// Computed style equals `value`
    pub async fn to_have_css(&self, property: &str, value: &str) -> LeadformResult<()> {
        self.to_satisfy(Condition::Css {
            property: property.to_string(),
            value: value.to_string(),
        })
        .await
    }

    /// Text matches `pattern`
    pub async fn to_contain_text(&self, pattern: TextPattern) -> LeadformResult<()> {
        self.to_satisfy(Condition::ContainsText(pattern)).await
    }

    /// Exactly `n` matches
    pub async fn to_have_count(&self, n: usize) -> LeadformResult<()> {
        self.to_satisfy(Condition::Count(n)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::locator::AriaRole;
    use crate::mock::{ElementSnapshot, MockDriver, VirtualPage};
    use std::time::Duration;
    use tokio::time::Instant;

    /// Checkbox that becomes enabled after 300ms
    #[derive(Debug)]
    struct SlowPage {
        born: Instant,
        url: String,
        ticked: bool,
    }

    impl SlowPage {
        fn new() -> Self {
            Self {
                born: Instant::now(),
                url: "https://site.test/".to_string(),
                ticked: false,
            }
        }
    }

    impl VirtualPage for SlowPage {
        fn url(&mut self) -> String {
            if self.born.elapsed() >= Duration::from_millis(200) {
                format!("{}thankyou", self.url)
            } else {
                self.url.clone()
            }
        }

        fn navigate(&mut self, url: &str) -> LeadformResult<()> {
            self.url = url.to_string();
            Ok(())
        }

        fn elements(&mut self) -> Vec<ElementSnapshot> {
            let ready = self.born.elapsed() >= Duration::from_millis(300);
            let mut tick = ElementSnapshot::new("tick", "input")
                .with_role(AriaRole::Checkbox, "Tick")
                .with_value("(555)123-4567")
                .with_attr("aria-hidden", "false")
                .with_style("opacity", "1")
                .checked(self.ticked);
            if !ready {
                tick = tick.disabled();
            }
            vec![tick]
        }

        fn fill(&mut self, _key: &str, _value: &str) -> LeadformResult<()> {
            Ok(())
        }

        fn click(&mut self, _key: &str) -> LeadformResult<()> {
            self.ticked = true;
            Ok(())
        }
    }

    fn options() -> WaitOptions {
        WaitOptions::new(Duration::from_secs(5), Duration::from_millis(100))
    }

    mod element_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_waits_for_enabled() {
            let driver = MockDriver::new(SlowPage::new());
            let tick = Locator::role(AriaRole::Checkbox, "tick").unwrap();
            let start = Instant::now();
            Expect::new(&driver, options()).that(&tick).to_be_enabled().await.unwrap();
            assert_eq!(start.elapsed(), Duration::from_millis(300));
        }

        #[tokio::test(start_paused = true)]
        async fn test_timeout_reports_last_observation() {
            let driver = MockDriver::new(SlowPage::new());
            let tick = Locator::role(AriaRole::Checkbox, "tick").unwrap();
            let err = Expect::new(&driver, options())
                .that(&tick)
                .to_be_checked()
                .await
                .unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains("be checked"), "{msg}");
            assert!(msg.contains("last observed unchecked"), "{msg}");
            assert_eq!(err.category(), crate::result::ErrorCategory::Timeout);
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_element_is_hidden() {
            let driver = MockDriver::new(SlowPage::new());
            let expect = Expect::new(&driver, options());
            let ghost = Locator::new("#ghost");
            expect.that(&ghost).to_be_hidden().await.unwrap();
            expect.that(&ghost).to_have_count(0).await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_value_attribute_and_css() {
            let driver = MockDriver::new(SlowPage::new());
            let expect = Expect::new(&driver, options());
            let tick = Locator::role(AriaRole::Checkbox, "tick").unwrap();
            expect
                .that(&tick)
                .to_have_value_matching(TextPattern::new(r"^\(\d{3}\)\d{3}-\d{4}$").unwrap())
                .await
                .unwrap();
            expect.that(&tick).to_have_attribute("aria-hidden", "false").await.unwrap();
            expect.that(&tick).to_have_css("opacity", "1").await.unwrap();
            expect.that(&tick).not_to_be_checked().await.unwrap();
        }
    }

    mod url_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_url_eventually_matches() {
            let driver = MockDriver::new(SlowPage::new());
            let url = Expect::new(&driver, options())
                .url_to_match(&TextPattern::new("/thankyou").unwrap())
                .await
                .unwrap();
            assert!(url.ends_with("thankyou"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_url_not_match_times_out_with_context() {
            let driver = MockDriver::new(SlowPage::new());
            tokio::time::sleep(Duration::from_millis(250)).await;
            let short = WaitOptions::new(Duration::from_millis(300), Duration::from_millis(100));
            let err = Expect::new(&driver, short)
                .url_not_to_match(&TextPattern::new("/thankyou").unwrap())
                .await
                .unwrap_err();
            assert!(err.to_string().contains("url to not match"));
        }
    }
}
