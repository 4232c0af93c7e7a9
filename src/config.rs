use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub display: DisplayConfig,
    pub sessions: SessionsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub samples: u64,
    pub tdelay_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            samples: 10,
            tdelay_secs: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub graphics: bool,
    pub sequential: bool,
    pub show_system_info: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            graphics: false,
            sequential: false,
            show_system_info: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub max_sessions: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        SessionsConfig { max_sessions: 32 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            json: false,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hoststat").join("config.toml"))
}

/// Loads the per-user config file, or defaults when there is none.
pub fn load_config() -> Result<Config, ConfigError> {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Ok(Config::default()),
    }
}

/// Loads an explicitly named config file. Unlike the per-user file, a
/// missing or malformed file here is an error.
pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.samples, 10);
        assert_eq!(config.general.tdelay_secs, 1);
        assert!(!config.display.graphics);
        assert!(!config.display.sequential);
        assert!(config.display.show_system_info);
        assert_eq!(config.sessions.max_sessions, 32);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
samples = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.samples, 3);
        // Other fields should be defaults
        assert_eq!(config.general.tdelay_secs, 1);
        assert_eq!(config.sessions.max_sessions, 32);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
samples = 20
tdelay_secs = 2

[display]
graphics = true
sequential = true
show_system_info = false

[sessions]
max_sessions = 4

[logging]
level = "debug"
json = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.samples, 20);
        assert_eq!(config.general.tdelay_secs, 2);
        assert!(config.display.graphics);
        assert!(config.display.sequential);
        assert!(!config.display.show_system_info);
        assert_eq!(config.sessions.max_sessions, 4);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config_from_path(Path::new("/nonexistent/path/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let temp = std::env::temp_dir().join("hoststat_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let result = load_config_from_path(&temp);
        let _ = std::fs::remove_file(&temp);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
