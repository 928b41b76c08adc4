//! Scenario harness: selection, isolated sessions, retries and outcomes
//!
//! Every scenario gets a fresh session from the [`SessionFactory`] and runs
//! start to finish on it; up to `workers` scenarios are in flight at once.
//! Retries apply to gating scenarios only. A non-gating scenario runs once
//! and its result is classified against its [`CaseStatus`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SuiteConfig;
use crate::data::{CaseStatus, TestData};
use crate::driver::{SessionFactory, SharedDriver};
use crate::form::WalkInBathForm;
use crate::reporter::{Reporter, ScenarioOutcome, ScenarioResult};
use crate::result::{LeadformError, LeadformResult};
use crate::slider::Slider;
use crate::video::Videos;

/// Everything a scenario body can use
#[derive(Clone)]
pub struct ScenarioContext {
    /// Session owned by this attempt
    pub driver: SharedDriver,
    /// Suite configuration
    pub config: Arc<SuiteConfig>,
    /// Fixture data
    pub data: Arc<TestData>,
}

impl fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl ScenarioContext {
    /// Form page object on this session
    pub fn form(&self) -> LeadformResult<WalkInBathForm> {
        WalkInBathForm::new(Arc::clone(&self.driver), &self.config)
    }

    /// Slider page object on this session
    pub fn slider(&self) -> LeadformResult<Slider> {
        Slider::new(Arc::clone(&self.driver), &self.config)
    }

    /// Video page object on this session
    #[must_use]
    pub fn videos(&self) -> Videos {
        Videos::new(Arc::clone(&self.driver), &self.config)
    }
}

/// Body of a scenario
pub type ScenarioBody =
    Arc<dyn Fn(ScenarioContext) -> BoxFuture<'static, LeadformResult<()>> + Send + Sync>;

/// A named, tagged unit of work
#[derive(Clone)]
pub struct Scenario {
    name: String,
    group: String,
    tags: Vec<String>,
    status: CaseStatus,
    body: ScenarioBody,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("tags", &self.tags)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Enforced scenario
    pub fn new<F>(name: impl Into<String>, group: impl Into<String>, body: F) -> Self
    where
        F: Fn(ScenarioContext) -> BoxFuture<'static, LeadformResult<()>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            group: group.into(),
            tags: Vec::new(),
            status: CaseStatus::Enforced,
            body: Arc::new(body),
        }
    }

    /// Set the status
    #[must_use]
    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.status = status;
        self
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Tags
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Status
    #[must_use]
    pub const fn status(&self) -> &CaseStatus {
        &self.status
    }

    /// Case-insensitive match on name, group or `@tag`
    #[must_use]
    pub fn matches(&self, grep: &str) -> bool {
        let needle = grep.to_lowercase();
        if let Some(tag) = needle.strip_prefix('@') {
            return self.tags.iter().any(|t| t.to_lowercase() == tag);
        }
        self.name.to_lowercase().contains(&needle) || self.group.to_lowercase().contains(&needle)
    }
}

/// Lowercase file name stem: alphanumerics kept, runs of anything else become `-`
fn file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }
    while stem.ends_with('-') {
        stem.pop();
    }
    stem
}

/// Classify the result of a scenario from its status and attempt history
#[must_use]
pub fn classify(status: &CaseStatus, passed: bool, attempts: u32, last_error: Option<&LeadformError>) -> ScenarioOutcome {
    match status {
        CaseStatus::Pending(_) => ScenarioOutcome::Skipped,
        CaseStatus::Enforced => match (passed, attempts) {
            (true, 1) => ScenarioOutcome::Passed,
            (true, _) => ScenarioOutcome::Flaky,
            (false, _) => ScenarioOutcome::Failed,
        },
        CaseStatus::KnownDefect(_) | CaseStatus::Disputed(_) => {
            if passed {
                if matches!(status, CaseStatus::KnownDefect(_)) {
                    ScenarioOutcome::UnexpectedPass
                } else {
                    ScenarioOutcome::Passed
                }
            } else if last_error.is_some_and(LeadformError::is_validation_failure) {
                ScenarioOutcome::ExpectedFailure
            } else {
                // broken plumbing never counts as the documented defect
                ScenarioOutcome::Failed
            }
        }
    }
}

/// Runs scenarios against sessions from a factory
pub struct SuiteRunner {
    config: Arc<SuiteConfig>,
    data: Arc<TestData>,
    factory: Arc<dyn SessionFactory>,
    grep: Option<String>,
}

impl fmt::Debug for SuiteRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("workers", &self.config.workers)
            .field("retries", &self.config.retries)
            .field("grep", &self.grep)
            .finish_non_exhaustive()
    }
}

impl SuiteRunner {
    /// Runner over `factory`
    #[must_use]
    pub fn new(config: SuiteConfig, data: TestData, factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            config: Arc::new(config),
            data: Arc::new(data),
            factory,
            grep: None,
        }
    }

    /// Only run scenarios matching `pattern` (see [`Scenario::matches`])
    #[must_use]
    pub fn with_grep(mut self, pattern: Option<String>) -> Self {
        self.grep = pattern.filter(|p| !p.trim().is_empty());
        self
    }

    /// Scenarios selected by the grep filter, in catalogue order
    #[must_use]
    pub fn select<'s>(&self, scenarios: &'s [Scenario]) -> Vec<&'s Scenario> {
        scenarios
            .iter()
            .filter(|s| self.grep.as_deref().map_or(true, |g| s.matches(g)))
            .collect()
    }

    /// Run the selection; results come back in catalogue order
    pub async fn run(&self, scenarios: &[Scenario]) -> Reporter {
        self.run_with_progress(scenarios, |_| {}).await
    }

    /// Run the selection, calling `on_result` as each scenario finishes
    pub async fn run_with_progress<F>(&self, scenarios: &[Scenario], mut on_result: F) -> Reporter
    where
        F: FnMut(&ScenarioResult),
    {
        let selected = self.select(scenarios);
        info!(
            selected = selected.len(),
            workers = self.config.workers,
            retries = self.config.retries,
            "running scenarios"
        );

        let mut finished: Vec<(usize, ScenarioResult)> = Vec::with_capacity(selected.len());
        let mut results = stream::iter(selected.into_iter().enumerate())
            .map(|(i, scenario)| async move { (i, self.run_one(scenario).await) })
            .buffer_unordered(self.config.workers.max(1));
        while let Some((i, result)) = results.next().await {
            on_result(&result);
            finished.push((i, result));
        }
        finished.sort_by_key(|(i, _)| *i);

        let mut reporter = Reporter::new();
        for (_, result) in finished {
            reporter.record(result);
        }
        reporter
    }

    /// Run one scenario with retries
    pub async fn run_one(&self, scenario: &Scenario) -> ScenarioResult {
        let status = scenario.status();
        if !status.is_runnable() {
            return ScenarioResult::new(scenario.name(), scenario.group(), ScenarioOutcome::Skipped)
                .with_reason(status.reason());
        }

        let max_attempts = if status.is_gating() {
            self.config.retries + 1
        } else {
            1
        };
        let start = Instant::now();
        let mut attempts = 0;
        let mut last_error = None;
        let mut screenshot = None;
        let mut passed = false;

        while attempts < max_attempts {
            attempts += 1;
            let (outcome, captured) = self.attempt(scenario, attempts).await;
            match outcome {
                Ok(()) => {
                    passed = true;
                    break;
                }
                Err(e) => {
                    if attempts < max_attempts {
                        warn!(scenario = scenario.name(), attempt = attempts, error = %e, "retrying");
                    }
                    last_error = Some(e);
                    screenshot = captured;
                }
            }
        }

        let outcome = classify(status, passed, attempts, last_error.as_ref());
        let elapsed: Duration = start.elapsed();
        match outcome {
            ScenarioOutcome::ExpectedFailure | ScenarioOutcome::UnexpectedPass => {
                warn!(scenario = scenario.name(), outcome = outcome.label(), reason = status.reason(), "non-gating scenario");
            }
            _ => info!(scenario = scenario.name(), outcome = outcome.label(), attempts, "scenario finished"),
        }

        let mut result = ScenarioResult::new(scenario.name(), scenario.group(), outcome)
            .with_timing(attempts, elapsed)
            .with_reason(status.reason());
        if !passed {
            if let Some(e) = last_error {
                result = result
                    .with_error(e.to_string(), e.category())
                    .with_screenshot(screenshot);
            }
        }
        result
    }

    /// One attempt on a fresh session; a failed body leaves a screenshot
    /// behind when enabled
    async fn attempt(&self, scenario: &Scenario, attempt: u32) -> (LeadformResult<()>, Option<PathBuf>) {
        let driver = match self.factory.open().await {
            Ok(driver) => driver,
            Err(e) => return (Err(e), None),
        };
        let ctx = ScenarioContext {
            driver: Arc::clone(&driver),
            config: Arc::clone(&self.config),
            data: Arc::clone(&self.data),
        };
        let outcome = (scenario.body)(ctx).await;

        let mut screenshot = None;
        if outcome.is_err() && self.config.screenshot_on_failure {
            match self.capture(&driver, scenario, attempt).await {
                Ok(path) => screenshot = Some(path),
                Err(e) => warn!(scenario = scenario.name(), error = %e, "screenshot failed"),
            }
        }
        if let Err(e) = driver.close().await {
            warn!(scenario = scenario.name(), error = %e, "closing session failed");
        }
        (outcome, screenshot)
    }

    async fn capture(&self, driver: &SharedDriver, scenario: &Scenario, attempt: u32) -> LeadformResult<PathBuf> {
        let png = driver.screenshot().await?;
        let dir = self.config.screenshot_dir();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}-{attempt}.png", file_stem(scenario.name())));
        tokio::fs::write(&path, png).await?;
        debug!(scenario = scenario.name(), path = %path.display(), "screenshot saved");
        Ok(path)
    }

    /// Release factory resources
    pub async fn shutdown(&self) -> LeadformResult<()> {
        self.factory.shutdown().await
    }
}
