//! Domain layer for objective synchronization
//!
//! Models, errors and the port traits the services are written against.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{SyncError, SyncResult};
