//! Domain models.

pub mod config;
pub mod instance;
pub mod objective;

pub use config::{
    BackoffConfig, Config, InstanceConfig, LoggingConfig, RemoteConfig, SyncConfig,
};
pub use instance::{InstanceHandle, InstanceParent, MatchKind, Representation, Resolution};
pub use objective::{names_match, ObjectiveRecord, ProgressRecord};
