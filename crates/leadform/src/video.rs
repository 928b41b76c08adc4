//! Page object for embedded videos

use crate::assertion::Expect;
use crate::config::SuiteConfig;
use crate::driver::SharedDriver;
use crate::locator::Locator;
use crate::result::{LeadformError, LeadformResult};
use crate::wait::WaitOptions;

/// Video elements on the homepage
#[derive(Clone)]
pub struct Videos {
    driver: SharedDriver,
    base_url: String,
    videos: Locator,
    expect_options: WaitOptions,
}

impl std::fmt::Debug for Videos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Videos")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Videos {
    /// Bind to a session
    #[must_use]
    pub fn new(driver: SharedDriver, config: &SuiteConfig) -> Self {
        Self {
            driver,
            base_url: config.url_for("/"),
            videos: Locator::new("video").with_strict(false),
            expect_options: WaitOptions::new(config.expect_timeout(), config.expect_poll_interval()),
        }
    }

    /// Load the homepage
    pub async fn open(&self) -> LeadformResult<()> {
        self.driver.goto(&self.base_url).await
    }

    /// Number of `<video>` elements
    pub async fn count(&self) -> LeadformResult<usize> {
        self.driver.count(&self.videos).await
    }

    /// The n-th video
    #[must_use]
    pub fn video(&self, index: usize) -> Locator {
        self.videos.nth(index)
    }

    /// At least one video, and every one visible
    pub async fn expect_all_visible(&self) -> LeadformResult<()> {
        let count = self.count().await?;
        if count == 0 {
            return Err(LeadformError::mismatch(
                "videos",
                "at least one video",
                "no video elements",
            ));
        }
        let expect = Expect::new(self.driver.as_ref(), self.expect_options);
        for i in 0..count {
            expect.that(&self.video(i)).to_be_visible().await?;
        }
        Ok(())
    }
}
