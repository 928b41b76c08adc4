//! Page object for the multi-step Walk-In Bath lead form
//!
//! The form is five input steps and a confirmation page:
//!
//! ```text
//! ZipCode ──Next──▶ Interests ──Next──▶ PropertyType ──Next──▶ ContactInfo
//!                                                                 │
//!        ThankYou ◀──Submit Your Request── Phone ◀──Go To Estimate┘
//! ```
//!
//! The step graph and the error surfaces live in [`step`] as data. The page
//! object splits into [`actions`] (enter values, advance), [`assertions`]
//! (expected outcomes) and [`navigation`] (reach a step with known-valid
//! inputs). None of them branch on a particular step.

pub mod actions;
pub mod assertions;
pub mod field;
pub mod locators;
pub mod navigation;
pub mod phone;
pub mod rules;
pub mod step;

pub use field::{FieldGroup, FieldId, FieldInput, FieldKind, FieldState, Interest, PropertyOption};
pub use locators::{FormLocators, FORM_CONTAINER};
pub use phone::{is_complete_mask, mask_phone, PHONE_MASK_PATTERN};
pub use step::{ErrorKind, ErrorRegion, FormStep, Outcome, StepContract, Transition};

use crate::assertion::Expect;
use crate::config::SuiteConfig;
use crate::driver::SharedDriver;
use crate::result::LeadformResult;
use crate::wait::WaitOptions;

/// Page object bound to one browser session
#[derive(Clone)]
pub struct WalkInBathForm {
    driver: SharedDriver,
    locators: FormLocators,
    base_url: String,
    expect_options: WaitOptions,
    settle_options: WaitOptions,
}

impl std::fmt::Debug for WalkInBathForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkInBathForm")
            .field("base_url", &self.base_url)
            .field("expect_options", &self.expect_options)
            .field("settle_options", &self.settle_options)
            .finish_non_exhaustive()
    }
}

impl WalkInBathForm {
    /// Bind to a session using the suite timing
    pub fn new(driver: SharedDriver, config: &SuiteConfig) -> LeadformResult<Self> {
        Ok(Self {
            driver,
            locators: FormLocators::new()?,
            base_url: config.url_for("/"),
            expect_options: WaitOptions::new(config.expect_timeout(), config.expect_poll_interval()),
            settle_options: WaitOptions::new(config.settle_window(), config.settle_interval()),
        })
    }

    /// Load the landing page
    pub async fn open(&self) -> LeadformResult<()> {
        tracing::debug!(url = %self.base_url, "opening lead form");
        self.driver.goto(&self.base_url).await
    }

    /// Underlying session
    #[must_use]
    pub fn driver(&self) -> &SharedDriver {
        &self.driver
    }

    /// Locator table
    #[must_use]
    pub const fn locators(&self) -> &FormLocators {
        &self.locators
    }

    /// Auto-waiting expectations with the suite timeout
    #[must_use]
    pub fn expect(&self) -> Expect<'_> {
        Expect::new(self.driver.as_ref(), self.expect_options)
    }

    /// Settle window used for stays-on-step checks
    #[must_use]
    pub const fn settle_options(&self) -> WaitOptions {
        self.settle_options
    }
}
