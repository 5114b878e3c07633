//! Local completion flags with optimistic writes.
//!
//! Writes land in the cache immediately and are pushed to the remote on a
//! spawned task. A rejected push restores the value the cache held before
//! the write; the next full sync repairs anything that is still off.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::ObjectiveRecord;
use crate::domain::ports::ObjectiveClient;

/// Outcome of applying one full-sync snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReplaceReport {
    pub applied: usize,
    pub skipped: usize,
    /// Names that appeared more than once; the later record won.
    pub duplicates: Vec<String>,
}

/// Mapping from objective name to completion flag.
#[derive(Clone)]
pub struct ProgressCache {
    entries: Arc<RwLock<HashMap<String, bool>>>,
    client: Arc<dyn ObjectiveClient>,
}

impl ProgressCache {
    pub fn new(client: Arc<dyn ObjectiveClient>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            client,
        }
    }

    /// Completion flag for `name`; unknown names read as not completed.
    pub async fn get(&self, name: &str) -> bool {
        self.entries.read().await.get(name).copied().unwrap_or(false)
    }

    /// Optimistically set `name` to `value`.
    ///
    /// Returns the push task when the value changed, `None` when it was
    /// already stored (nothing is pushed). The task resolves to
    /// `OptimisticWriteRejected` after rolling the cache back.
    pub async fn set(&self, name: &str, value: bool) -> Option<JoinHandle<SyncResult<()>>> {
        if name.is_empty() {
            warn!("ignoring progress write for empty objective name");
            return None;
        }

        let prior = {
            let mut entries = self.entries.write().await;
            let prior = entries.get(name).copied();
            if prior == Some(value) {
                return None;
            }
            entries.insert(name.to_string(), value);
            prior
        };

        let entries = Arc::clone(&self.entries);
        let client = Arc::clone(&self.client);
        let name = name.to_string();

        Some(tokio::spawn(async move {
            match client.push_progress(&name, value).await {
                Ok(()) => {
                    debug!(objective = %name, completed = value, "progress pushed");
                    Ok(())
                }
                Err(e) => {
                    let mut entries = entries.write().await;
                    // A newer write or sync owns the entry now
                    if entries.get(&name) == Some(&value) {
                        match prior {
                            Some(previous) => entries.insert(name.clone(), previous),
                            None => entries.remove(&name),
                        };
                    }
                    warn!(
                        objective = %name,
                        completed = value,
                        error = %e,
                        "progress push failed, local value rolled back"
                    );
                    Err(SyncError::OptimisticWriteRejected {
                        name,
                        reason: e.to_string(),
                    })
                }
            }
        }))
    }

    /// Mark `name` completed.
    pub async fn complete(&self, name: &str) -> Option<JoinHandle<SyncResult<()>>> {
        self.set(name, true).await
    }

    /// Mark `name` not completed.
    pub async fn reset(&self, name: &str) -> Option<JoinHandle<SyncResult<()>>> {
        self.set(name, false).await
    }

    /// Overwrite entries from a full fetch. Records without a usable name are
    /// skipped with a warning; nothing is pushed back to the remote.
    pub async fn bulk_replace(&self, records: &[ObjectiveRecord]) -> BulkReplaceReport {
        let mut report = BulkReplaceReport::default();
        let mut seen = HashSet::new();
        let mut entries = self.entries.write().await;

        for record in records {
            let Some(progress) = record.to_progress() else {
                warn!(id = record.id, "objective with null or empty name skipped");
                report.skipped += 1;
                continue;
            };

            if !seen.insert(progress.name.clone()) {
                warn!(objective = %progress.name, "duplicate objective name in sync payload");
                report.duplicates.push(progress.name.clone());
            }

            entries.insert(progress.name, progress.completed);
            report.applied += 1;
        }

        report
    }

    /// Copy of every known flag, ordered by name.
    pub async fn snapshot(&self) -> BTreeMap<String, bool> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(name, done)| (name.clone(), *done))
            .collect()
    }
}
