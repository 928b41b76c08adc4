//! In-process browser stand-in
//!
//! [`MockDriver`] implements [`BrowserDriver`](crate::driver::BrowserDriver)
//! over any [`VirtualPage`]; [`SimulatedLeadSite`] is the page model of the
//! homepage used by the test suites and by `leadform run --simulated`.

mod driver;
mod site;
mod snapshot;

pub use driver::{MockDriver, VirtualPage, PLACEHOLDER_PNG};
pub use site::{SimulatedLeadSite, SimulatedSessionFactory, SiteBehavior};
pub use snapshot::{ElementSnapshot, NodeInfo};
