//! Leadform CLI: run the Walk-In Bath lead form suite
//!
//! ## Usage
//!
//! ```bash
//! leadform run --simulated            # Whole catalogue, in-process site
//! leadform run --grep zip --retries 2 # Live run (needs --features browser)
//! leadform list --grep @known-defect  # Catalogue with status tags
//! leadform config --base-url URL      # Effective configuration as YAML
//! ```

use std::process::ExitCode;

use clap::Parser;
use leadform::logging::{init_tracing, level_for_verbosity, LogFormat};
use leadform_cli::{execute, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    init_tracing(format, level_for_verbosity(cli.verbose, cli.quiet));

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
