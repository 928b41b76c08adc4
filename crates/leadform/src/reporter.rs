//! Reporter - scenario results, summaries and report files
//!
//! ```text
//! ┌──────────────┐   record()   ┌──────────────┐   write_to(dir)
//! │ SuiteRunner  │ ───────────▶ │   Reporter   │ ───────────────▶ results.json
//! └──────────────┘              └──────────────┘                  junit.xml
//! ```
//!
//! Known-defect and disputed scenarios are never dropped: they appear with
//! their outcome and reason, they just do not count as failures.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::{ErrorCategory, LeadformResult};

/// Final outcome of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioOutcome {
    /// Passed on the first attempt
    Passed,
    /// Failed on every attempt
    Failed,
    /// Passed after at least one failed attempt
    Flaky,
    /// Non-gating scenario failed as documented
    ExpectedFailure,
    /// Known-defect scenario passed (the site may have been fixed)
    UnexpectedPass,
    /// Not run
    Skipped,
}

impl ScenarioOutcome {
    /// Whether this outcome fails the run
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Short label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Flaky => "flaky",
            Self::ExpectedFailure => "expected failure",
            Self::UnexpectedPass => "unexpected pass",
            Self::Skipped => "skipped",
        }
    }
}

/// Result of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Catalogue group (zip, email, slider, ...)
    pub group: String,
    /// Outcome
    pub outcome: ScenarioOutcome,
    /// Attempts made
    pub attempts: u32,
    /// Time spent over all attempts
    pub duration: Duration,
    /// Last error, if any
    pub error: Option<String>,
    /// Category of the last error
    pub category: Option<ErrorCategory>,
    /// Why a non-enforced scenario is not gating
    pub reason: Option<String>,
    /// Screenshot taken when the last attempt failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
    /// Completion time
    pub finished_at: DateTime<Utc>,
}

impl ScenarioResult {
    /// Result without error
    #[must_use]
    pub fn new(name: impl Into<String>, group: impl Into<String>, outcome: ScenarioOutcome) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            outcome,
            attempts: 0,
            duration: Duration::ZERO,
            error: None,
            category: None,
            reason: None,
            screenshot: None,
            finished_at: Utc::now(),
        }
    }

    /// Attach the last error
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>, category: ErrorCategory) -> Self {
        self.error = Some(message.into());
        self.category = Some(category);
        self
    }

    /// Attach the non-gating reason
    #[must_use]
    pub fn with_reason(mut self, reason: Option<&str>) -> Self {
        self.reason = reason.map(str::to_string);
        self
    }

    /// Attach a failure screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: Option<PathBuf>) -> Self {
        self.screenshot = path;
        self
    }

    /// Set attempts and duration
    #[must_use]
    pub const fn with_timing(mut self, attempts: u32, duration: Duration) -> Self {
        self.attempts = attempts;
        self.duration = duration;
        self
    }
}

/// Collects results and renders reports
#[derive(Debug, Clone)]
pub struct Reporter {
    suite_name: String,
    results: Vec<ScenarioResult>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON document written to `results.json`
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    suite: &'a str,
    summary: JsonSummary,
    results: &'a [ScenarioResult],
}

#[derive(Debug, Serialize)]
struct JsonSummary {
    total: usize,
    passed: usize,
    failed: usize,
    flaky: usize,
    expected_failures: usize,
    unexpected_passes: usize,
    skipped: usize,
}

impl Reporter {
    /// Empty reporter
    #[must_use]
    pub fn new() -> Self {
        Self {
            suite_name: "leadform".to_string(),
            results: Vec::new(),
        }
    }

    /// Set suite name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Record a result
    pub fn record(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    /// All results in recording order
    #[must_use]
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    /// Number of results with an outcome
    #[must_use]
    pub fn count(&self, outcome: ScenarioOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Total results
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Results that fail the run
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results
            .iter()
            .filter(|r| r.outcome.is_failure())
            .collect()
    }

    /// No gating failures
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures().is_empty()
    }

    /// Sum of scenario durations
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{}: {} passed, {} failed",
            self.suite_name,
            self.count(ScenarioOutcome::Passed) + self.count(ScenarioOutcome::Flaky),
            self.count(ScenarioOutcome::Failed),
        );
        for outcome in [
            ScenarioOutcome::Flaky,
            ScenarioOutcome::ExpectedFailure,
            ScenarioOutcome::UnexpectedPass,
            ScenarioOutcome::Skipped,
        ] {
            let n = self.count(outcome);
            if n > 0 {
                line.push_str(&format!(", {n} {}", outcome.label()));
            }
        }
        line.push_str(&format!(" ({} total)", self.total_count()));
        line
    }

    /// Render `results.json`
    pub fn render_json(&self) -> LeadformResult<String> {
        let report = JsonReport {
            suite: &self.suite_name,
            summary: JsonSummary {
                total: self.total_count(),
                passed: self.count(ScenarioOutcome::Passed),
                failed: self.count(ScenarioOutcome::Failed),
                flaky: self.count(ScenarioOutcome::Flaky),
                expected_failures: self.count(ScenarioOutcome::ExpectedFailure),
                unexpected_passes: self.count(ScenarioOutcome::UnexpectedPass),
                skipped: self.count(ScenarioOutcome::Skipped),
            },
            results: &self.results,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Render JUnit XML for CI integration
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.count(ScenarioOutcome::Failed),
            self.count(ScenarioOutcome::Skipped) + self.count(ScenarioOutcome::ExpectedFailure),
            self.total_duration().as_secs_f64()
        ));
        xml.push('\n');

        for result in &self.results {
            xml.push_str(&format!(
                r#"  <testcase classname="{}" name="{}" time="{:.3}">"#,
                escape_xml(&result.group),
                escape_xml(&result.name),
                result.duration.as_secs_f64()
            ));
            xml.push('\n');

            let error = result.error.as_deref().unwrap_or_default();
            let reason = result.reason.as_deref().unwrap_or_default();
            match result.outcome {
                ScenarioOutcome::Failed => xml.push_str(&format!(
                    "    <failure message=\"{}\">{}</failure>\n",
                    escape_xml(error),
                    escape_xml(error)
                )),
                ScenarioOutcome::Skipped => xml.push_str(&format!(
                    "    <skipped message=\"{}\"/>\n",
                    escape_xml(reason)
                )),
                ScenarioOutcome::ExpectedFailure => xml.push_str(&format!(
                    "    <skipped message=\"expected failure: {}\">{}</skipped>\n",
                    escape_xml(reason),
                    escape_xml(error)
                )),
                ScenarioOutcome::UnexpectedPass => xml.push_str(&format!(
                    "    <system-out>unexpected pass: {}</system-out>\n",
                    escape_xml(reason)
                )),
                ScenarioOutcome::Flaky => xml.push_str(&format!(
                    "    <system-out>passed after {} attempts</system-out>\n",
                    result.attempts
                )),
                ScenarioOutcome::Passed => {}
            }
            if let Some(path) = &result.screenshot {
                xml.push_str(&format!(
                    "    <system-out>[[ATTACHMENT|{}]]</system-out>\n",
                    escape_xml(&path.display().to_string())
                ));
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    /// Write `results.json` and `junit.xml` under `dir`
    pub fn write_to(&self, dir: &Path) -> LeadformResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let json_path = dir.join("results.json");
        std::fs::write(&json_path, self.render_json()?)?;
        let junit_path = dir.join("junit.xml");
        std::fs::write(&junit_path, self.render_junit())?;
        Ok(vec![json_path, junit_path])
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
