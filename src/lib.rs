//! objective-sync - keeps a local world model in step with remote objectives
//!
//! A remote service tracks named objectives and whether each is completed.
//! This crate polls that service, keeps a local cache of completion flags
//! (with optimistic, roll-back-on-failure writes) and maintains a bounded set
//! of live instances, one per completed objective, with a FIFO backlog for
//! completed objectives waiting for a free slot.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): cache, diffing, admission, lifecycle, scheduling
//! - **Infrastructure Layer** (`infrastructure`): HTTP client, instance factory, config, logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use objective_sync::{CatalogInstanceFactory, Config, HttpObjectiveClient, SyncContext, SyncScheduler};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let client = Arc::new(HttpObjectiveClient::new(config.remote.clone().into())?);
//! let factory = Arc::new(CatalogInstanceFactory::from_config(&config.instances));
//! let mut scheduler = SyncScheduler::new(Arc::new(SyncContext::new(config, client, factory)));
//! scheduler.start();
//! // ...
//! scheduler.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{SyncError, SyncResult};
pub use domain::models::{
    Config, InstanceHandle, InstanceParent, MatchKind, ObjectiveRecord, ProgressRecord,
    Representation, Resolution,
};
pub use domain::ports::{InstanceFactory, ObjectiveClient};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::{CatalogInstanceFactory, HttpObjectiveClient, MockObjectiveClient};
pub use services::{
    AdmissionController, CompletionDiff, CompletionTracker, InstanceLifecycleController,
    ProgressCache, ReconcileReport, SyncContext, SyncScheduler,
};
