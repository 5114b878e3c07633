//! Remote progress service adapters.

pub mod client;
pub mod mock_client;

pub use client::{HttpObjectiveClient, HttpObjectiveClientConfig};
pub use mock_client::MockObjectiveClient;
