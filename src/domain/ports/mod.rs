//! Port trait definitions (Hexagonal Architecture)
//!
//! The synchronization core depends only on these seams:
//! - ObjectiveClient: the remote progress service
//! - InstanceFactory: creation and destruction of live representations

pub mod instance_factory;
pub mod objective_client;

pub use instance_factory::InstanceFactory;
pub use objective_client::ObjectiveClient;
