use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::ConfigError;

/// Builds the diagnostics filter: `--log-level` wins, then `RUST_LOG`, then
/// the config file.
pub fn build_filter(cli_level: Option<&str>, config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    let directive = match cli_level {
        Some(level) => level.to_owned(),
        None => std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| config.level.clone()),
    };
    EnvFilter::try_new(&directive).map_err(|_| ConfigError::LogLevel(directive))
}

/// Installs the global subscriber. Diagnostics go to stderr so they never
/// interleave with reports on stdout.
pub fn init_tracing(filter: EnvFilter, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed (tests); keep the first one.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.with_ansi(false).try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_takes_precedence() {
        let config = LoggingConfig {
            level: "not a level ===".to_string(),
            json: false,
        };
        let filter = build_filter(Some("debug"), &config).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn invalid_level_is_a_config_error() {
        let err = build_filter(Some("hoststat=loud"), &LoggingConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::LogLevel(level) if level == "hoststat=loud"));
    }
}
