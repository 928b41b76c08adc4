//! Leadform: end-to-end suite for the Walk-In Bath lead form
//!
//! The homepage hosts a five-step lead form (ZIP code, interests, property
//! type, contact info, phone) that ends on a thank-you page, plus an image
//! slider and embedded videos. This crate models the form as a step table,
//! drives it through an async [`BrowserDriver`], and classifies every
//! equivalence-class case as proceeding or staying on its step.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   LEADFORM Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌─────────────────────┐   │
//! │   │ TestData + │    │ SuiteRunner│    │ BrowserDriver       │   │
//! │   │ catalogue  │───►│ (sessions, │───►│ ChromiumDriver (CDP)│   │
//! │   │            │    │  retries)  │    │ MockDriver (sim)    │   │
//! │   └────────────┘    └─────┬──────┘    └─────────────────────┘   │
//! │                           ▼                                      │
//! │          WalkInBathForm / Slider / Videos page objects           │
//! │          Expect (auto-wait) + hold_state (settle window)         │
//! │                           ▼                                      │
//! │                  Reporter (summary, JSON, JUnit)                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use leadform::prelude::*;
//!
//! # async fn run() -> LeadformResult<()> {
//! let config = SuiteConfig::from_env();
//! let data = TestData::standard();
//! let factory = Arc::new(SimulatedSessionFactory::new(&config.base_url, SiteBehavior::default()));
//! let scenarios = standard_catalogue(&data);
//! let reporter = SuiteRunner::new(config, data, factory).run(&scenarios).await;
//! println!("{}", reporter.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Auto-waiting expectations
pub mod assertion;

/// CDP driver (requires the `browser` feature)
#[cfg(feature = "browser")]
pub mod browser;

/// The scenario catalogue
pub mod catalogue;

/// Suite configuration
pub mod config;

/// Equivalence-class test data
pub mod data;

/// Browser automation seam
pub mod driver;

/// Lead form page object and step-flow model
pub mod form;

/// Scenario harness
pub mod harness;

/// Element locators
pub mod locator;

/// Tracing setup
pub mod logging;

/// Simulated site and in-process driver
pub mod mock;

/// Scenario results and report rendering
pub mod reporter;

mod result;

/// Image slider page object
pub mod slider;

/// Embedded video page object
pub mod video;

/// Polling waits and settle windows
pub mod wait;

pub use assertion::{Condition, Expect, LocatorExpect};
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumSessionFactory};
pub use catalogue::standard_catalogue;
pub use config::SuiteConfig;
pub use data::{CaseInput, CaseStatus, CaseTag, TestCase, TestData, ValidData};
pub use driver::{BrowserDriver, SessionFactory, SharedDriver};
pub use form::WalkInBathForm;
pub use harness::{Scenario, ScenarioContext, SuiteRunner};
pub use locator::{AriaRole, Locator, Selector, TextPattern};
pub use reporter::{Reporter, ScenarioOutcome, ScenarioResult};
pub use result::{ErrorCategory, LeadformError, LeadformResult};
pub use slider::Slider;
pub use video::Videos;
pub use wait::{hold_state, Held, HoldReport, WaitOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    #[cfg(feature = "browser")]
    pub use super::browser::*;
    pub use super::catalogue::*;
    pub use super::config::*;
    pub use super::data::*;
    pub use super::driver::*;
    pub use super::form::{
        ErrorKind, ErrorRegion, FieldGroup, FieldId, FieldInput, FormStep, Interest, Outcome,
        PropertyOption, Transition, WalkInBathForm,
    };
    pub use super::harness::*;
    pub use super::locator::*;
    pub use super::mock::{
        MockDriver, SimulatedLeadSite, SimulatedSessionFactory, SiteBehavior, VirtualPage,
    };
    pub use super::reporter::*;
    pub use super::result::*;
    pub use super::slider::*;
    pub use super::video::*;
    pub use super::wait::*;
}
