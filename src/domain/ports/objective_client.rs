use async_trait::async_trait;

use crate::domain::errors::SyncResult;
use crate::domain::models::ObjectiveRecord;

/// Accessor for the remote progress service.
///
/// Every call is a single request/response with no retry; callers must treat
/// each one as fallible. Retrying is the scheduler's job.
#[async_trait]
pub trait ObjectiveClient: Send + Sync {
    /// Fetch every objective the remote knows about.
    async fn fetch_all(&self) -> SyncResult<Vec<ObjectiveRecord>>;

    /// Fetch the names of objectives whose completion flag equals `completed`.
    async fn fetch_by_completion(&self, completed: bool) -> SyncResult<Vec<String>>;

    /// Persist the completion flag of the objective named `name`.
    async fn push_progress(&self, name: &str, completed: bool) -> SyncResult<()>;
}
