use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for objective-sync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Remote progress service
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Periodic task timing
    #[serde(default)]
    pub sync: SyncConfig,

    /// Live instance admission
    #[serde(default)]
    pub instances: InstanceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub const fn full_sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync.full_sync_interval_secs)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.sync.poll_interval_ms)
    }

    pub const fn backoff_ceiling(&self) -> Duration {
        Duration::from_secs(self.sync.backoff.max_interval_secs)
    }
}

/// Remote service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RemoteConfig {
    /// Base URL of the objectives resource
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000/api/game/objectives".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Periodic task configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncConfig {
    /// Period of the full-state sync in seconds
    #[serde(default = "default_full_sync_interval_secs")]
    pub full_sync_interval_secs: u64,

    /// Period of the completion poll in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Failure backoff, off by default
    #[serde(default)]
    pub backoff: BackoffConfig,
}

const fn default_full_sync_interval_secs() -> u64 {
    30
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            full_sync_interval_secs: default_full_sync_interval_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Backoff applied to a periodic task after consecutive failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackoffConfig {
    /// When false, failed ticks retry after exactly one period
    #[serde(default)]
    pub enabled: bool,

    /// Upper bound on the grown sleep, in seconds
    #[serde(default = "default_max_interval_secs")]
    pub max_interval_secs: u64,
}

const fn default_max_interval_secs() -> u64 {
    300
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_interval_secs: default_max_interval_secs(),
        }
    }
}

/// Live instance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InstanceConfig {
    /// Maximum number of concurrently live instances
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Representation used when no name matches
    #[serde(default)]
    pub default_representation: Option<String>,

    /// Known representation names, in lookup order
    #[serde(default)]
    pub representations: Vec<String>,

    /// Container instances are attached to
    #[serde(default = "default_container")]
    pub container: String,
}

const fn default_capacity() -> usize {
    3
}

fn default_container() -> String {
    "ObjectivesContainer".to_string()
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            default_representation: None,
            representations: vec![],
            container: default_container(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
