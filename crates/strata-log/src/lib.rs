//! Structured logging for the strata compiler.
//!
//! Console output with uptime timestamps and thread names, plus an optional
//! JSON log file. `RUST_LOG` wins over the configured level.

use std::path::Path;

use strata_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config sets a level.
/// Per-sub-graph trace output from the density crate stays off.
const DEFAULT_FILTER: &str = "info,strata_density=warn";

const LOG_FILE: &str = "strata.log";

/// The filter directive for `config`, before `RUST_LOG` is considered.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file
/// * `debug_build` - write the JSON log file even when the config does not ask for it
/// * `config` - source of the log level and the `log_to_file` switch
///
/// Returns `false` if a global subscriber was already installed.
///
/// ```no_run
/// use strata_config::Config;
/// use strata_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), cfg!(debug_assertions), Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true) // compile workers are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let to_file = debug_build || config.is_some_and(|c| c.debug.log_to_file);
    if to_file
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        return subscriber.with(file_layer).try_init().is_ok();
    }

    subscriber.try_init().is_ok()
}

/// An `EnvFilter` with the default directive.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter_str = default_env_filter().to_string();
        assert!(filter_str.contains("strata_density=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_config_level_wins_over_default() {
        let mut config = Config::default();
        config.debug.log_level = "debug,strata_terrain=trace".to_string();
        assert_eq!(filter_directive(Some(&config)), "debug,strata_terrain=trace");
    }

    #[test]
    fn test_blank_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&config)), DEFAULT_FILTER);
        assert_eq!(filter_directive(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_directives_parse() {
        for directive in ["info", "debug,strata_terrain=trace", "warn,strata_density=debug"] {
            assert!(EnvFilter::try_new(directive).is_ok(), "failed to parse {directive}");
        }
    }

    #[test]
    fn test_second_init_reports_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.debug.log_to_file = true;
        let first = init_logging(Some(dir.path()), false, Some(&config));
        let second = init_logging(None, false, None);
        assert!(!second, "only one global subscriber can be installed");
        if first {
            assert!(dir.path().join(LOG_FILE).exists());
        }
    }
}
