//! Leadform CLI Library
//!
//! Command-line interface for the leadform end-to-end suite: run the
//! scenario catalogue live or against the simulated site, list it, and show
//! the effective configuration.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ListArgs, RunArgs, SuiteArgs};
pub use config::{resolve_suite_config, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;

/// Dispatch a parsed command line
pub fn execute(cli: Cli) -> CliResult<()> {
    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    let color = ColorChoice::from(cli.color).should_color();

    match cli.command {
        Commands::Run(args) => {
            handlers::execute_run(&args, ProgressReporter::new(color, verbosity.is_quiet()))
        }
        Commands::List(args) => handlers::execute_list(&args, &mut std::io::stdout().lock()),
        Commands::Config(args) => handlers::execute_config(&args, &mut std::io::stdout().lock()),
    }
}
