//! CLI configuration: output preferences and suite config resolution

use leadform::SuiteConfig;

use crate::commands::SuiteArgs;
use crate::error::{CliError, CliResult};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet - failures and summary only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - every scenario line
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// From the `-q` flag and `-v` count
    #[must_use]
    pub const fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

/// Build the suite configuration: YAML file, then environment, then flags
pub fn resolve_suite_config<F>(args: &SuiteArgs, env: F) -> CliResult<SuiteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match &args.config {
        Some(path) => SuiteConfig::from_yaml_file(path)
            .map_err(|e| CliError::config(format!("cannot load {}: {e}", path.display())))?,
        None => SuiteConfig::default(),
    };
    let mut config = base.with_env_from(env);

    if let Some(url) = &args.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    if let Some(retries) = args.retries {
        config = config.with_retries(retries);
    }
    if args.headed {
        config = config.with_headless(false);
    }
    if args.no_sandbox {
        config = config.with_no_sandbox();
    }
    if let Some(dir) = &args.report_dir {
        config = config.with_report_dir(dir.clone());
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(4, false), Verbosity::Debug);
            assert!(Verbosity::from_flags(2, true).is_quiet());
        }

        #[test]
        fn test_color_choice() {
            assert!(ColorChoice::Always.should_color());
            assert!(!ColorChoice::Never.should_color());
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_flags_override_env() {
            let args = SuiteArgs {
                base_url: Some("https://flag.test".to_string()),
                retries: Some(5),
                ..SuiteArgs::default()
            };
            let config = resolve_suite_config(&args, |key| match key {
                "BASE_URL" => Some("https://env.test".to_string()),
                "CI" => Some("true".to_string()),
                _ => None,
            })
            .unwrap();
            assert_eq!(config.base_url, "https://flag.test");
            assert_eq!(config.retries, 5);
            assert_eq!(config.workers, 4);
        }

        #[test]
        fn test_env_overrides_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "base_url: https://file.test\nworkers: 3").unwrap();
            let args = SuiteArgs {
                config: Some(file.path().to_path_buf()),
                ..SuiteArgs::default()
            };

            let config = resolve_suite_config(&args, no_env).unwrap();
            assert_eq!(config.base_url, "https://file.test");
            assert_eq!(config.workers, 3);

            let config =
                resolve_suite_config(&args, |k| (k == "BASE_URL").then(|| "https://env.test".to_string()))
                    .unwrap();
            assert_eq!(config.base_url, "https://env.test");
        }

        #[test]
        fn test_invalid_flag_rejected() {
            let args = SuiteArgs {
                workers: Some(0),
                ..SuiteArgs::default()
            };
            let err = resolve_suite_config(&args, no_env).unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }

        #[test]
        fn test_headed_and_report_dir() {
            let args = SuiteArgs {
                headed: true,
                report_dir: Some("out".into()),
                ..SuiteArgs::default()
            };
            let config = resolve_suite_config(&args, no_env).unwrap();
            assert!(!config.headless);
            assert_eq!(config.report_dir, std::path::PathBuf::from("out"));
        }
    }
}
