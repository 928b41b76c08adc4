//! Command handlers - extracted from main.rs for testability

use std::io::Write;
use std::sync::Arc;

use leadform::mock::{SimulatedSessionFactory, SiteBehavior};
use leadform::{
    standard_catalogue, CaseStatus, Scenario, ScenarioOutcome, SessionFactory, SuiteConfig, SuiteRunner, TestData,
};
use tracing::{info, warn};

use crate::commands::{ConfigArgs, ListArgs, RunArgs};
use crate::config::resolve_suite_config;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// `leadform run`
pub fn execute_run(args: &RunArgs, output: ProgressReporter) -> CliResult<()> {
    let config = resolve_suite_config(&args.suite, process_env)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_suite(args, config, output))
}

async fn run_suite(args: &RunArgs, config: SuiteConfig, output: ProgressReporter) -> CliResult<()> {
    let factory = session_factory(args.simulated, &config).await?;
    run_with_factory(args, config, factory, output).await
}

async fn run_with_factory(
    args: &RunArgs,
    config: SuiteConfig,
    factory: Arc<dyn SessionFactory>,
    mut output: ProgressReporter,
) -> CliResult<()> {
    let data = TestData::standard();
    let scenarios = standard_catalogue(&data);
    let report_dir = config.report_dir.clone();
    let base_url = config.base_url.clone();

    let runner = SuiteRunner::new(config, data, factory).with_grep(args.grep.clone());
    let selected = runner.select(&scenarios).len();
    if selected == 0 {
        return Err(CliError::invalid_argument(format!(
            "no scenario matches '{}'",
            args.grep.as_deref().unwrap_or_default()
        )));
    }

    info!(%base_url, simulated = args.simulated, selected, "starting run");
    output.start_progress(selected as u64, &base_url);
    let reporter = runner
        .run_with_progress(&scenarios, |result| output.scenario(result))
        .await;
    output.finish();

    let written = reporter.write_to(&report_dir);
    if let Err(e) = runner.shutdown().await {
        warn!(error = %e, "browser shutdown failed");
        output.warning(&format!("browser shutdown failed: {e}"));
    }
    for path in &written? {
        output.info(&format!("wrote {}", path.display()));
    }
    let fixed = reporter.count(ScenarioOutcome::UnexpectedPass);
    if fixed > 0 {
        output.warning(&format!("{fixed} non-gating scenarios now pass; review their status"));
    }
    output.summary(&reporter);

    let failed = reporter.failures().len();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed,
            total: reporter.total_count(),
        })
    }
}

async fn session_factory(simulated: bool, config: &SuiteConfig) -> CliResult<Arc<dyn SessionFactory>> {
    if simulated {
        return Ok(Arc::new(SimulatedSessionFactory::new(
            config.base_url.clone(),
            SiteBehavior::default(),
        )));
    }
    #[cfg(feature = "browser")]
    {
        Ok(Arc::new(leadform::ChromiumSessionFactory::launch(config).await?))
    }
    #[cfg(not(feature = "browser"))]
    {
        Err(CliError::BrowserUnavailable)
    }
}

/// One catalogue line for `leadform list`
#[must_use]
pub fn list_line(scenario: &Scenario) -> String {
    let status = scenario.status();
    let mut line = format!("{:<13} [{}] {}", status.label(), scenario.group(), scenario.name());
    if let CaseStatus::KnownDefect(reason) | CaseStatus::Disputed(reason) | CaseStatus::Pending(reason) = status {
        line.push_str(&format!(" ({reason})"));
    }
    line
}

/// `leadform list`
pub fn execute_list(args: &ListArgs, out: &mut impl Write) -> CliResult<()> {
    let data = TestData::standard();
    let scenarios = standard_catalogue(&data);
    let selected: Vec<&Scenario> = scenarios
        .iter()
        .filter(|s| args.grep.as_deref().map_or(true, |g| s.matches(g)))
        .collect();
    for scenario in &selected {
        writeln!(out, "{}", list_line(scenario))?;
    }
    writeln!(out, "{} of {} scenarios", selected.len(), scenarios.len())?;
    Ok(())
}

/// `leadform config`
pub fn execute_config(args: &ConfigArgs, out: &mut impl Write) -> CliResult<()> {
    let config = resolve_suite_config(&args.suite, process_env)?;
    write!(out, "{}", config.to_yaml()?)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::SuiteArgs;
    use async_trait::async_trait;
    use leadform::{LeadformError, LeadformResult, SharedDriver};

    mod run_tests {
        use super::*;

        /// Simulated sessions whose teardown always fails
        struct BrokenTeardown(SimulatedSessionFactory);

        #[async_trait]
        impl SessionFactory for BrokenTeardown {
            async fn open(&self) -> LeadformResult<SharedDriver> {
                self.0.open().await
            }

            async fn shutdown(&self) -> LeadformResult<()> {
                Err(LeadformError::driver("browser already gone"))
            }
        }

        #[tokio::test]
        async fn test_reports_survive_failed_shutdown() {
            let dir = tempfile::tempdir().unwrap();
            let config = SuiteConfig::new()
                .with_base_url("https://site.test")
                .with_workers(2)
                .with_report_dir(dir.path());
            let factory = Arc::new(BrokenTeardown(SimulatedSessionFactory::new(
                "https://site.test",
                SiteBehavior::default(),
            )));
            let args = RunArgs {
                grep: Some("@smoke".to_string()),
                simulated: true,
                suite: SuiteArgs::default(),
            };

            run_with_factory(&args, config, factory, ProgressReporter::new(false, true))
                .await
                .unwrap();
            assert!(dir.path().join("results.json").exists());
            assert!(dir.path().join("junit.xml").exists());
        }
    }

    mod list_tests {
        use super::*;

        #[test]
        fn test_list_filters_by_tag() {
            let mut out = Vec::new();
            let args = ListArgs {
                grep: Some("@known-defect".to_string()),
            };
            execute_list(&args, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert_eq!(text.lines().filter(|l| l.starts_with("known-defect")).count(), 3);
            assert!(text.contains("(site accepts malformed email addresses)"));
            assert!(text.trim_end().ends_with("scenarios"));
        }

        #[test]
        fn test_enforced_line_has_no_reason() {
            let data = TestData::standard();
            let catalogue = standard_catalogue(&data);
            let line = list_line(&catalogue[0]);
            assert!(line.starts_with("enforced"));
            assert!(!line.contains('('));
        }
    }
}
