//! Page object for the homepage image slider
//!
//! The slider is a slick carousel: slides carry `data-slick-index`, the
//! active one also has `.slick-active.slick-current`, and a transition is
//! finished once the target slide is fully opaque and exposed to assistive
//! technology.

use tracing::debug;

use crate::assertion::Expect;
use crate::config::SuiteConfig;
use crate::driver::SharedDriver;
use crate::locator::{AriaRole, Locator};
use crate::result::{LeadformError, LeadformResult};
use crate::wait::WaitOptions;

/// Slider root selector
pub const SLIDER_ROOT: &str = "[data-main-slider]";

/// Slides on the production homepage
pub const EXPECTED_SLIDE_COUNT: usize = 8;

/// Index expected after "Next" from `current` (`-1` means none active)
#[must_use]
pub fn next_index(current: i64, count: usize) -> usize {
    let n = count as i64;
    (current + 1).rem_euclid(n) as usize
}

/// Index expected after "Previous" from `current`
#[must_use]
pub fn previous_index(current: i64, count: usize) -> usize {
    let n = count as i64;
    (current - 1 + n).rem_euclid(n) as usize
}

/// Slider page object bound to one session
#[derive(Clone)]
pub struct Slider {
    driver: SharedDriver,
    base_url: String,
    root: Locator,
    previous: Locator,
    next: Locator,
    slides: Locator,
    active: Locator,
    expect_options: WaitOptions,
    transition_options: WaitOptions,
}

impl std::fmt::Debug for Slider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slider")
            .field("base_url", &self.base_url)
            .field("transition_options", &self.transition_options)
            .finish_non_exhaustive()
    }
}

impl Slider {
    /// Bind to a session
    pub fn new(driver: SharedDriver, config: &SuiteConfig) -> LeadformResult<Self> {
        Ok(Self {
            driver,
            base_url: config.url_for("/"),
            root: Locator::new(SLIDER_ROOT),
            previous: Locator::role(AriaRole::Button, "previous")?,
            next: Locator::role_exact(AriaRole::Button, "Next")?,
            slides: Locator::new("[data-slick-index]")
                .within(SLIDER_ROOT)
                .with_strict(false),
            active: Locator::new("[data-slick-index].slick-active.slick-current")
                .within(SLIDER_ROOT)
                .with_strict(false),
            expect_options: WaitOptions::new(config.expect_timeout(), config.expect_poll_interval()),
            transition_options: WaitOptions::new(
                config.slider_transition(),
                config.expect_poll_interval(),
            ),
        })
    }

    /// Load the homepage
    pub async fn open(&self) -> LeadformResult<()> {
        self.driver.goto(&self.base_url).await
    }

    fn expect(&self) -> Expect<'_> {
        Expect::new(self.driver.as_ref(), self.expect_options)
    }

    /// Slide with a given `data-slick-index`
    #[must_use]
    pub fn slide(&self, index: usize) -> Locator {
        Locator::new(format!(r#"[data-slick-index="{index}"]"#)).within(SLIDER_ROOT)
    }

    /// Image of the n-th slide in document order
    #[must_use]
    pub fn slide_image(&self, index: usize) -> Locator {
        Locator::new("img")
            .within(format!(r#"{SLIDER_ROOT} [data-slick-index="{index}"]"#))
            .with_strict(false)
            .nth(0)
    }

    /// Number of slides
    pub async fn slide_count(&self) -> LeadformResult<usize> {
        self.driver.count(&self.slides).await
    }

    /// `data-slick-index` of the active slide, or `-1` when none is active
    pub async fn active_index(&self) -> LeadformResult<i64> {
        if self.driver.count(&self.active).await? == 0 {
            return Ok(-1);
        }
        let raw = self.driver.attribute(&self.active, "data-slick-index").await?;
        Ok(raw.and_then(|v| v.trim().parse().ok()).unwrap_or(-1))
    }

    /// Click "Next" and wait for the following slide
    pub async fn click_next(&self) -> LeadformResult<usize> {
        let (current, count) = self.position().await?;
        let expected = next_index(current, count);
        self.press(&self.next, expected).await
    }

    /// Click "Previous" and wait for the preceding slide
    pub async fn click_previous(&self) -> LeadformResult<usize> {
        let (current, count) = self.position().await?;
        let expected = previous_index(current, count);
        self.press(&self.previous, expected).await
    }

    async fn position(&self) -> LeadformResult<(i64, usize)> {
        let count = self.slide_count().await?;
        if count == 0 {
            return Err(LeadformError::driver("no slides available"));
        }
        Ok((self.active_index().await?, count))
    }

    async fn press(&self, button: &Locator, expected: usize) -> LeadformResult<usize> {
        self.expect().that(button).to_be_enabled().await?;
        self.driver.click(button).await?;
        self.wait_for_active(expected).await?;
        debug!(slide = expected, "slide active");
        Ok(expected)
    }

    /// Wait until slide `index` is fully shown
    pub async fn wait_for_active(&self, index: usize) -> LeadformResult<()> {
        let slide = self.slide(index);
        let expect = self.expect().with_options(self.transition_options);
        let slide_expect = expect.that(&slide);
        slide_expect
            .to_have_attribute("data-slick-index", &index.to_string())
            .await?;
        slide_expect.to_have_css("opacity", "1").await?;
        slide_expect.to_have_attribute("aria-hidden", "false").await
    }

    /// Step forward or backward until slide `target` is active
    pub async fn navigate_to_slide(&self, target: usize) -> LeadformResult<()> {
        let count = self.slide_count().await?;
        if target >= count {
            return Err(LeadformError::invalid_definition(format!(
                "slide index {target} is out of range (0-{})",
                count.saturating_sub(1)
            )));
        }
        let current = self.active_index().await?;
        let steps = target as i64 - current;
        for _ in 0..steps.unsigned_abs() {
            if steps > 0 {
                self.click_next().await?;
            } else {
                self.click_previous().await?;
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Assertions
    // -------------------------------------------------------------------------

    /// Slider root is visible
    pub async fn expect_visible(&self) -> LeadformResult<()> {
        self.expect().that(&self.root).to_be_visible().await
    }

    /// Previous and Next are visible
    pub async fn expect_navigation_visible(&self) -> LeadformResult<()> {
        self.expect().that(&self.previous).to_be_visible().await?;
        self.expect().that(&self.next).to_be_visible().await
    }

    /// Exactly `expected` slides
    pub async fn expect_slide_count(&self, expected: usize) -> LeadformResult<()> {
        let count = self.slide_count().await?;
        if count == expected {
            Ok(())
        } else {
            Err(LeadformError::mismatch(
                "slider",
                format!("{expected} slides"),
                format!("{count} slides"),
            ))
        }
    }

    /// Active slide is `expected`
    pub async fn expect_active_index(&self, expected: usize) -> LeadformResult<()> {
        let active = self.active_index().await?;
        if active == expected as i64 {
            Ok(())
        } else {
            Err(LeadformError::mismatch(
                "slider",
                format!("slide {expected} active"),
                format!("slide {active} active"),
            ))
        }
    }

    /// Every slide shows its image
    pub async fn expect_all_images_loaded(&self) -> LeadformResult<()> {
        let count = self.slide_count().await?;
        for i in 0..count {
            self.expect().that(&self.slide_image(i)).to_be_visible().await?;
        }
        Ok(())
    }

    /// Visit every slide in order
    pub async fn expect_can_visit_all_slides(&self) -> LeadformResult<()> {
        for i in 0..self.slide_count().await? {
            self.navigate_to_slide(i).await?;
            self.expect_active_index(i).await?;
        }
        Ok(())
    }

    /// "Next" from the last slide wraps to the first
    pub async fn expect_circular_navigation(&self) -> LeadformResult<()> {
        let count = self.slide_count().await?;
        if count < 2 {
            return Ok(());
        }
        self.navigate_to_slide(0).await?;
        for i in 0..count {
            self.click_next().await?;
            self.expect_active_index((i + 1) % count).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod index_tests {
        use super::*;

        #[test]
        fn test_next_wraps() {
            assert_eq!(next_index(0, 8), 1);
            assert_eq!(next_index(7, 8), 0);
            assert_eq!(next_index(-1, 8), 0);
        }

        #[test]
        fn test_previous_wraps() {
            assert_eq!(previous_index(1, 8), 0);
            assert_eq!(previous_index(0, 8), 7);
        }
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn prop_next_then_previous_is_identity(count in 1usize..50, seed in 0usize..1000) {
                let current = seed % count;
                let forward = next_index(current as i64, count);
                prop_assert!(forward < count);
                prop_assert_eq!(previous_index(forward as i64, count), current);
            }

            #[test]
            fn prop_count_nexts_return_home(count in 1usize..20, seed in 0usize..1000) {
                let start = seed % count;
                let mut at = start;
                for _ in 0..count {
                    at = next_index(at as i64, count);
                }
                prop_assert_eq!(at, start);
            }
        }
    }
}
