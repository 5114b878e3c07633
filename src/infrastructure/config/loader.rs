use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid capacity: {0}. Must be at least 1")]
    InvalidCapacity(usize),

    #[error("Remote base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid base_url {0}: {1}")]
    InvalidBaseUrl(String, String),

    #[error("Invalid {0}: must be greater than 0")]
    ZeroInterval(&'static str),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error(
        "Invalid backoff configuration: max_interval_secs ({0}) must be at least full_sync_interval_secs ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .objective-sync/config.yaml
    /// 3. .objective-sync/local.yaml (optional local overrides)
    /// 4. Environment variables (OBJECTIVE_SYNC_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".objective-sync/config.yaml"))
            .merge(Yaml::file(".objective-sync/local.yaml"))
            .merge(Env::prefixed("OBJECTIVE_SYNC_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.instances.capacity == 0 {
            return Err(ConfigError::InvalidCapacity(config.instances.capacity));
        }

        let base_url = config.remote.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if let Err(e) = reqwest::Url::parse(base_url) {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string(), e.to_string()));
        }

        if config.remote.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroInterval("request_timeout_secs"));
        }
        if config.sync.full_sync_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("full_sync_interval_secs"));
        }
        if config.sync.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("poll_interval_ms"));
        }

        let backoff = &config.sync.backoff;
        if backoff.enabled && backoff.max_interval_secs < config.sync.full_sync_interval_secs {
            return Err(ConfigError::InvalidBackoff(
                backoff.max_interval_secs,
                config.sync.full_sync_interval_secs,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.instances.capacity, 3);
        assert_eq!(config.sync.full_sync_interval_secs, 30);
        assert_eq!(config.sync.poll_interval_ms, 1000);
        assert!(!config.sync.backoff.enabled);
        assert!(config.instances.default_representation.is_none());
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
remote:
  base_url: http://game.local/api/game/objectives
sync:
  full_sync_interval_secs: 10
  poll_interval_ms: 250
instances:
  capacity: 5
  default_representation: Placeholder
  representations:
    - Door
    - Lamp
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.remote.base_url, "http://game.local/api/game/objectives");
        assert_eq!(config.remote.request_timeout_secs, 30);
        assert_eq!(config.full_sync_interval(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.instances.capacity, 5);
        assert_eq!(
            config.instances.default_representation.as_deref(),
            Some("Placeholder")
        );
        assert_eq!(config.instances.representations, vec!["Door", "Lamp"]);
        assert_eq!(config.instances.container, "ObjectivesContainer");
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = Config::default();
        config.instances.capacity = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn test_validate_base_url() {
        let mut config = Config::default();
        config.remote.base_url = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyBaseUrl)
        ));

        config.remote.base_url = "not a url".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBaseUrl(_, _))
        ));
    }

    #[test]
    fn test_validate_zero_intervals() {
        let mut config = Config::default();
        config.sync.poll_interval_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroInterval("poll_interval_ms"))
        ));
    }

    #[test]
    fn test_validate_backoff_only_when_enabled() {
        let mut config = Config::default();
        config.sync.backoff.max_interval_secs = 5;
        assert!(ConfigLoader::validate(&config).is_ok());

        config.sync.backoff.enabled = true;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(5, 30))
        ));
    }

    #[test]
    fn test_validate_logging() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));

        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRotation(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "instances:\n  capacity: 7\n  default_representation: Blank").unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.instances.capacity, 7);
        assert_eq!(config.instances.default_representation.as_deref(), Some("Blank"));
        assert_eq!(config.sync.full_sync_interval_secs, 30);
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "instances:\n  capacity: 0").unwrap();
        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("OBJECTIVE_SYNC_INSTANCES__CAPACITY", Some("4")),
                ("OBJECTIVE_SYNC_SYNC__POLL_INTERVAL_MS", Some("200")),
            ],
            || {
                let config = ConfigLoader::load().unwrap();
                assert_eq!(config.instances.capacity, 4);
                assert_eq!(config.sync.poll_interval_ms, 200);
            },
        );
    }
}
