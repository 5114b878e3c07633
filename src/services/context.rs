//! Shared context for the synchronization components.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::lifecycle::{InstanceLifecycleController, ReconcileReport};
use super::progress_cache::{BulkReplaceReport, ProgressCache};
use crate::domain::errors::SyncResult;
use crate::domain::models::Config;
use crate::domain::ports::{InstanceFactory, ObjectiveClient};

/// Everything the periodic tasks and external writers share.
///
/// Built once at startup and handed around behind an `Arc`.
pub struct SyncContext {
    pub config: Config,
    pub client: Arc<dyn ObjectiveClient>,
    pub cache: ProgressCache,
    pub lifecycle: InstanceLifecycleController,
}

impl SyncContext {
    pub fn new(
        config: Config,
        client: Arc<dyn ObjectiveClient>,
        factory: Arc<dyn InstanceFactory>,
    ) -> Self {
        let cache = ProgressCache::new(Arc::clone(&client));
        let lifecycle = InstanceLifecycleController::from_config(factory, &config.instances);
        Self {
            config,
            client,
            cache,
            lifecycle,
        }
    }

    /// One full-state sync: fetch every objective and overwrite the cache.
    pub async fn full_sync_once(&self) -> SyncResult<BulkReplaceReport> {
        let objectives = self.client.fetch_all().await?;
        let report = self.cache.bulk_replace(&objectives).await;
        debug!(
            applied = report.applied,
            skipped = report.skipped,
            "full sync applied"
        );
        Ok(report)
    }

    /// One completion poll: fetch both completion filters and reconcile live
    /// instances against the completed names.
    ///
    /// A failed completed-fetch leaves all state untouched. The pending list
    /// is only logged.
    pub async fn poll_once(&self) -> SyncResult<ReconcileReport> {
        let (completed, pending) = tokio::join!(
            self.client.fetch_by_completion(true),
            self.client.fetch_by_completion(false)
        );

        match pending {
            Ok(pending) => debug!(remote_pending = pending.len(), "remote pending objectives"),
            Err(e) => warn!(error = %e, "failed to fetch pending objectives"),
        }

        let report = self.lifecycle.reconcile(completed?).await;
        if !report.is_noop() {
            info!(
                admitted = ?report.admitted,
                evicted = ?report.evicted,
                queued = ?report.queued,
                dropped = ?report.dropped,
                "completion poll reconciled"
            );
        }
        Ok(report)
    }
}
