use crate::domain::errors::SyncResult;
use crate::domain::models::{InstanceHandle, InstanceParent, Resolution};

/// Builds and tears down the live representation of an objective.
///
/// Implementations are synchronous: the lifecycle controller calls them
/// while holding its table lock.
pub trait InstanceFactory: Send + Sync {
    /// Resolve a representation: exact name, then case-insensitive, then the
    /// configured default. Fails with `SyncError::NoRepresentation` when
    /// even the default is absent.
    fn resolve(&self, objective: &str) -> SyncResult<Resolution>;

    /// Create a live instance for `objective` from a resolved representation.
    fn create(
        &self,
        objective: &str,
        resolution: &Resolution,
        parent: &InstanceParent,
    ) -> InstanceHandle;

    /// Destroy a live instance.
    fn destroy(&self, handle: InstanceHandle);
}
