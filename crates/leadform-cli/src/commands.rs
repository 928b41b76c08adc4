//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Leadform: end-to-end suite for the Walk-In Bath lead form
#[derive(Parser, Debug)]
#[command(name = "leadform")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only failures and the summary)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scenario catalogue
    Run(RunArgs),

    /// List scenarios with their status
    List(ListArgs),

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Options that feed the suite configuration
#[derive(Parser, Debug, Default, Clone)]
pub struct SuiteArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Site under test (overrides BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Scenarios in flight at once
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Retries for a failing enforced scenario
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Launch chromium without its sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Directory for results.json and junit.xml
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Only run scenarios whose name or group contains PATTERN (or `@tag`)
    #[arg(short, long, value_name = "PATTERN")]
    pub grep: Option<String>,

    /// Run against the in-process simulated site instead of a browser
    #[arg(long)]
    pub simulated: bool,

    /// Suite configuration
    #[command(flatten)]
    pub suite: SuiteArgs,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list scenarios matching PATTERN
    #[arg(short, long, value_name = "PATTERN")]
    pub grep: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Suite configuration
    #[command(flatten)]
    pub suite: SuiteArgs,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_run_with_overrides() {
            let cli = Cli::try_parse_from([
                "leadform",
                "run",
                "--simulated",
                "--grep",
                "zip",
                "--workers",
                "2",
                "--retries",
                "1",
                "--base-url",
                "https://staging.test",
            ])
            .unwrap();
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert!(args.simulated);
            assert_eq!(args.grep.as_deref(), Some("zip"));
            assert_eq!(args.suite.workers, Some(2));
            assert_eq!(args.suite.retries, Some(1));
            assert_eq!(args.suite.base_url.as_deref(), Some("https://staging.test"));
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::try_parse_from(["leadform", "list", "-vv", "--json-logs"]).unwrap();
            assert_eq!(cli.verbose, 2);
            assert!(cli.json_logs);
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["leadform"]).is_err());
        }

        #[test]
        fn test_unknown_color_rejected() {
            assert!(Cli::try_parse_from(["leadform", "--color", "sometimes", "list"]).is_err());
        }
    }
}
