//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Default filter directive for a verbosity count (`-v`, `-vv`)
#[must_use]
pub const fn level_for_verbosity(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_level`. Returns `false` when a subscriber
/// was already installed (repeat calls from tests are harmless).
pub fn init_tracing(format: LogFormat, default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Compact => builder.compact().try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0, false), "info");
        assert_eq!(level_for_verbosity(1, false), "debug");
        assert_eq!(level_for_verbosity(3, false), "trace");
        assert_eq!(level_for_verbosity(2, true), "warn");
    }

    #[test]
    fn test_second_init_reports_false() {
        let _ = init_tracing(LogFormat::Compact, "warn");
        assert!(!init_tracing(LogFormat::Json, "warn"));
    }
}
