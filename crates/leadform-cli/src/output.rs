//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use leadform::{Reporter, ScenarioOutcome, ScenarioResult};

/// Progress reporter for a suite run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    /// Report one finished scenario and advance the bar
    pub fn scenario(&self, result: &ScenarioResult) {
        let line = self.format_result(result);
        if result.outcome.is_failure() || !self.quiet {
            self.write(&line);
        }
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }

    /// One line for a scenario result
    #[must_use]
    pub fn format_result(&self, result: &ScenarioResult) -> String {
        let (symbol, plain, color) = match result.outcome {
            ScenarioOutcome::Passed => ("✓", "PASS", Style::new().green().bold()),
            ScenarioOutcome::Failed => ("✗", "FAIL", Style::new().red().bold()),
            ScenarioOutcome::Flaky => ("~", "FLAKY", Style::new().yellow().bold()),
            ScenarioOutcome::ExpectedFailure => ("x", "XFAIL", Style::new().yellow()),
            ScenarioOutcome::UnexpectedPass => ("!", "XPASS", Style::new().magenta().bold()),
            ScenarioOutcome::Skipped => ("-", "SKIP", Style::new().dim()),
        };
        let prefix = if self.use_color {
            color.apply_to(symbol).to_string()
        } else {
            plain.to_string()
        };

        let mut line = format!("{prefix} [{}] {}", result.group, result.name);
        if let Some(reason) = &result.reason {
            line.push_str(&format!(" ({reason})"));
        }
        if result.outcome.is_failure() {
            if let Some(error) = &result.error {
                line.push_str(&format!("\n    {error}"));
            }
        }
        line
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };
        self.write(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        self.write(&format!("{prefix} {message}"));
    }

    /// Print the run summary (always, failures or not)
    pub fn summary(&self, reporter: &Reporter) {
        let failed = reporter.count(ScenarioOutcome::Failed);
        let status = if failed > 0 { "FAILED" } else { "PASSED" };
        let status = if self.use_color {
            let s = if failed > 0 {
                Style::new().red().bold()
            } else {
                Style::new().green().bold()
            };
            s.apply_to(status).to_string()
        } else {
            status.to_string()
        };

        self.write("");
        self.write(&format!(
            "{status} {} in {:.2}s",
            reporter.summary(),
            reporter.total_duration().as_secs_f64()
        ));
    }

    fn write(&self, line: &str) {
        match self.progress_bar {
            Some(ref pb) if !pb.is_finished() => pb.println(line),
            _ => {
                let _ = self.term.write_line(line);
            }
        }
    }
}
