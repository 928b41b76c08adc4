//! Bounded polling waits
//!
//! Two shapes of wait live here:
//!
//! - **Settle holds** confirm that nothing changes for a fixed window. The
//!   site raises no "I will not transition" event, so a stays-on-step check
//!   polls the step markers for the whole window and fails on the first poll
//!   that sees a change.
//! - **Poll-until** waits for a positive condition, bounded by a timeout.
//!
//! Both use `tokio::time`, so tests can run them on paused time.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::{DEFAULT_SETTLE_INTERVAL_MS, DEFAULT_SETTLE_WINDOW_MS};
use crate::driver::BrowserDriver;
use crate::locator::Locator;
use crate::result::{LeadformError, LeadformResult};

// =============================================================================
// OPTIONS
// =============================================================================

/// Total duration and poll interval of a bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Upper bound of the wait
    pub timeout: Duration,
    /// Time between polls
    pub interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::settle()
    }
}

impl WaitOptions {
    /// Explicit bounds
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// The stays-on-step window: 1500ms polled every 200ms
    #[must_use]
    pub const fn settle() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_SETTLE_WINDOW_MS),
            Duration::from_millis(DEFAULT_SETTLE_INTERVAL_MS),
        )
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

// =============================================================================
// SETTLE HOLDS
// =============================================================================

/// Expected visibility of one locator during a hold
#[derive(Debug, Clone)]
pub struct Held<'a> {
    /// Element to watch
    pub locator: &'a Locator,
    /// Visibility it must keep
    pub visible: bool,
}

impl<'a> Held<'a> {
    /// Must stay visible
    #[must_use]
    pub const fn visible(locator: &'a Locator) -> Self {
        Self {
            locator,
            visible: true,
        }
    }

    /// Must stay hidden
    #[must_use]
    pub const fn hidden(locator: &'a Locator) -> Self {
        Self {
            locator,
            visible: false,
        }
    }
}

/// Summary of a completed hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldReport {
    /// Number of polls taken
    pub polls: u32,
    /// Time spent
    pub elapsed: Duration,
}

/// Confirm that `locator` stays visible for the whole window.
///
/// The first poll happens immediately; a poll that sees the element hidden
/// fails at once with `StateChangedUnexpectedly`. Driver errors propagate
/// unchanged. The last poll happens at or before the deadline.
pub async fn verify_remains_visible(
    driver: &dyn BrowserDriver,
    locator: &Locator,
    options: WaitOptions,
) -> LeadformResult<HoldReport> {
    hold_state(driver, &[Held::visible(locator)], options).await
}

/// Confirm that every entry keeps its expected visibility for the window
pub async fn hold_state(
    driver: &dyn BrowserDriver,
    expectations: &[Held<'_>],
    options: WaitOptions,
) -> LeadformResult<HoldReport> {
    if options.interval.is_zero() {
        return Err(LeadformError::config("settle interval must be non-zero"));
    }
    let start = Instant::now();
    let deadline = start + options.timeout;
    let mut polls = 0u32;

    loop {
        polls += 1;
        for held in expectations {
            let visible = driver.is_visible(held.locator).await?;
            if visible != held.visible {
                let elapsed = start.elapsed();
                warn!(
                    locator = %held.locator,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "state changed during settle window"
                );
                return Err(LeadformError::StateChangedUnexpectedly {
                    locator: held.locator.to_string(),
                    became: if visible { "visible" } else { "hidden" }.to_string(),
                    elapsed_ms: elapsed.as_millis() as u64,
                    duration_ms: options.timeout_ms(),
                });
            }
        }

        let now = Instant::now();
        if now >= deadline {
            break;
        }
        tokio::time::sleep(options.interval.min(deadline - now)).await;
    }

    let report = HoldReport {
        polls,
        elapsed: start.elapsed(),
    };
    debug!(polls, elapsed_ms = report.elapsed.as_millis() as u64, "settle hold passed");
    Ok(report)
}

// =============================================================================
// POLL UNTIL
// =============================================================================

/// Poll `probe` until it yields `Some`, or fail with `Timeout`.
///
/// The probe runs at least once even with a zero timeout.
pub async fn poll_until<T, F, Fut>(
    options: WaitOptions,
    waited_for: &str,
    mut probe: F,
) -> LeadformResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LeadformResult<Option<T>>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout;
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(LeadformError::Timeout {
                ms: options.timeout_ms(),
                waited_for: waited_for.to_string(),
            });
        }
        tokio::time::sleep(options.interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{ElementSnapshot, MockDriver, VirtualPage};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Banner that hides itself `hide_after` after creation
    #[derive(Debug)]
    struct FadingBanner {
        born: Instant,
        hide_after: Option<Duration>,
        show_after: Option<Duration>,
    }

    impl FadingBanner {
        fn new(hide_after: Option<Duration>, show_after: Option<Duration>) -> Self {
            Self {
                born: Instant::now(),
                hide_after,
                show_after,
            }
        }
    }

    impl VirtualPage for FadingBanner {
        fn url(&mut self) -> String {
            "https://site.test/".to_string()
        }

        fn navigate(&mut self, _url: &str) -> LeadformResult<()> {
            Ok(())
        }

        fn elements(&mut self) -> Vec<ElementSnapshot> {
            let age = self.born.elapsed();
            let banner_visible = self.hide_after.map_or(true, |t| age < t);
            let popup_visible = self.show_after.is_some_and(|t| age >= t);
            vec![
                ElementSnapshot::new("banner", "div")
                    .with_id("banner")
                    .shown(banner_visible),
                ElementSnapshot::new("popup", "div")
                    .with_id("popup")
                    .shown(popup_visible),
            ]
        }

        fn fill(&mut self, _key: &str, _value: &str) -> LeadformResult<()> {
            Ok(())
        }

        fn click(&mut self, _key: &str) -> LeadformResult<()> {
            Ok(())
        }
    }

    mod settle_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_stays_visible_for_full_window() {
            let driver = MockDriver::new(FadingBanner::new(None, None));
            let report = verify_remains_visible(&driver, &Locator::new("#banner"), WaitOptions::settle())
                .await
                .unwrap();
            // polls at 0, 200, ..., 1400 and the boundary poll at 1500
            assert_eq!(report.polls, 9);
            assert_eq!(report.elapsed, Duration::from_millis(1500));
        }

        #[tokio::test(start_paused = true)]
        async fn test_fails_fast_when_hidden_mid_window() {
            let driver =
                MockDriver::new(FadingBanner::new(Some(Duration::from_millis(500)), None));
            let start = Instant::now();
            let err = verify_remains_visible(&driver, &Locator::new("#banner"), WaitOptions::settle())
                .await
                .unwrap_err();
            match err {
                LeadformError::StateChangedUnexpectedly {
                    elapsed_ms,
                    duration_ms,
                    ref became,
                    ..
                } => {
                    assert_eq!(elapsed_ms, 600);
                    assert_eq!(duration_ms, 1500);
                    assert_eq!(became, "hidden");
                }
                other => panic!("unexpected error: {other}"),
            }
            assert!(start.elapsed() < Duration::from_millis(1500));
        }

        #[tokio::test(start_paused = true)]
        async fn test_initially_hidden_fails_on_first_poll() {
            let driver = MockDriver::new(FadingBanner::new(Some(Duration::ZERO), None));
            let start = Instant::now();
            let err = verify_remains_visible(&driver, &Locator::new("#banner"), WaitOptions::settle())
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                LeadformError::StateChangedUnexpectedly { elapsed_ms: 0, .. }
            ));
            assert_eq!(start.elapsed(), Duration::ZERO);
        }

        #[tokio::test(start_paused = true)]
        async fn test_uneven_window_does_not_overshoot() {
            let driver = MockDriver::new(FadingBanner::new(None, None));
            let options = WaitOptions::new(Duration::from_millis(500), Duration::from_millis(200));
            let report = verify_remains_visible(&driver, &Locator::new("#banner"), options)
                .await
                .unwrap();
            assert_eq!(report.elapsed, Duration::from_millis(500));
            assert_eq!(report.polls, 4);
        }

        #[tokio::test(start_paused = true)]
        async fn test_hold_detects_appearing_element() {
            let driver =
                MockDriver::new(FadingBanner::new(None, Some(Duration::from_millis(300))));
            let banner = Locator::new("#banner");
            let popup = Locator::new("#popup");
            let err = hold_state(
                &driver,
                &[Held::visible(&banner), Held::hidden(&popup)],
                WaitOptions::settle(),
            )
            .await
            .unwrap_err();
            assert!(err.to_string().contains("became visible"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_element_counts_as_hidden() {
            let driver = MockDriver::new(FadingBanner::new(None, None));
            let err = verify_remains_visible(&driver, &Locator::new("#gone"), WaitOptions::settle())
                .await
                .unwrap_err();
            assert_eq!(err.category(), crate::result::ErrorCategory::PrematureTransition);
        }

        #[tokio::test]
        async fn test_zero_interval_rejected() {
            let driver = MockDriver::new(FadingBanner::new(None, None));
            let options = WaitOptions::new(Duration::from_millis(100), Duration::ZERO);
            let err = verify_remains_visible(&driver, &Locator::new("#banner"), options)
                .await
                .unwrap_err();
            assert!(matches!(err, LeadformError::Config { .. }));
        }
    }

    mod poll_until_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_returns_first_some() {
            let calls = AtomicU32::new(0);
            let value = poll_until(WaitOptions::settle(), "third call", || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok((n == 3).then_some(n)) }
            })
            .await
            .unwrap();
            assert_eq!(value, 3);
        }

        #[tokio::test(start_paused = true)]
        async fn test_times_out() {
            let options = WaitOptions::new(Duration::from_millis(300), Duration::from_millis(100));
            let err = poll_until(options, "never", || async { Ok(None::<()>) })
                .await
                .unwrap_err();
            assert!(matches!(err, LeadformError::Timeout { ms: 300, .. }));
            assert!(err.to_string().contains("never"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_probe_errors_propagate() {
            let err = poll_until(WaitOptions::settle(), "x", || async {
                Err::<Option<()>, _>(LeadformError::driver("socket closed"))
            })
            .await
            .unwrap_err();
            assert!(matches!(err, LeadformError::Driver { .. }));
        }
    }
}
