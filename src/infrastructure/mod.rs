//! Infrastructure layer module
//!
//! Adapters and external integrations:
//! - Remote progress service client (reqwest) and an in-memory mock
//! - Catalog-backed instance factory
//! - Configuration management
//! - Logging infrastructure
//!
//! Implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod factory;
pub mod logging;
pub mod remote;

pub use factory::CatalogInstanceFactory;
pub use remote::{HttpObjectiveClient, HttpObjectiveClientConfig, MockObjectiveClient};
