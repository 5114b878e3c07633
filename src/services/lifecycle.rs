//! Instance lifecycle: reconciles live instances against the remote
//! completed set under a fixed capacity.
//!
//! Each reconcile runs under one lock and never suspends while holding it:
//!
//! 1. diff the new completed set against the previous snapshot
//! 2. drop removed names from the backlog
//! 3. evict removed live names; every eviction immediately admits the
//!    earliest admissible pending name
//! 4. admit added names while capacity remains, queue the rest
//! 5. retry deferred names if a slot is still free
//! 6. replace the snapshot
//!
//! A completed, non-evicted name is always either live or pending, never both.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::admission::AdmissionController;
use super::completion_tracker::CompletionTracker;
use crate::domain::models::{InstanceConfig, InstanceHandle, InstanceParent, Resolution};
use crate::domain::ports::InstanceFactory;

/// What one reconcile changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub admitted: Vec<String>,
    /// Subset of `admitted` that fell back to the default representation.
    pub degraded: Vec<String>,
    pub evicted: Vec<String>,
    pub queued: Vec<String>,
    /// Pending names that left the completed set before being admitted.
    pub dropped: Vec<String>,
    /// Pending names with no resolvable representation despite a free slot.
    pub deferred: Vec<String>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.admitted.is_empty()
            && self.evicted.is_empty()
            && self.queued.is_empty()
            && self.dropped.is_empty()
    }
}

/// A live objective and its instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveInstance {
    pub objective: String,
    pub handle: InstanceHandle,
}

/// Point-in-time view of the lifecycle tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleSnapshot {
    pub capacity: usize,
    /// Sorted by objective name.
    pub live: Vec<LiveInstance>,
    /// FIFO order.
    pub pending: Vec<String>,
    pub completed: Vec<String>,
}

#[derive(Debug, Default)]
struct LifecycleState {
    tracker: CompletionTracker,
    admission: AdmissionController,
    live: HashMap<String, InstanceHandle>,
}

/// Owns the live-instance table and the pending backlog.
pub struct InstanceLifecycleController {
    state: Mutex<LifecycleState>,
    factory: Arc<dyn InstanceFactory>,
    parent: InstanceParent,
}

impl InstanceLifecycleController {
    pub fn new(factory: Arc<dyn InstanceFactory>, capacity: usize, parent: InstanceParent) -> Self {
        Self {
            state: Mutex::new(LifecycleState {
                admission: AdmissionController::new(capacity),
                ..LifecycleState::default()
            }),
            factory,
            parent,
        }
    }

    pub fn from_config(factory: Arc<dyn InstanceFactory>, config: &InstanceConfig) -> Self {
        Self::new(
            factory,
            config.capacity,
            InstanceParent {
                container: config.container.clone(),
            },
        )
    }

    /// Apply a freshly polled completed set.
    pub async fn reconcile(&self, completed: Vec<String>) -> ReconcileReport {
        let mut state = self.state.lock().await;
        let diff = state.tracker.diff(&completed);
        let mut report = ReconcileReport::default();

        // Backlog first: a freed slot must never go to a name leaving this tick
        for name in &diff.removed {
            if state.admission.remove_pending(name) {
                debug!(objective = %name, "pending objective dropped");
                report.dropped.push(name.clone());
            }
        }

        for name in diff.removed {
            if let Some(handle) = state.live.remove(&name) {
                self.factory.destroy(handle);
                info!(objective = %name, "instance evicted");
                report.evicted.push(name);
                self.admit_next(&mut state, &mut report);
            }
        }

        for name in diff.added {
            if state.live.contains_key(&name) || state.admission.is_pending(&name) {
                continue;
            }
            let resolution = if state.admission.has_capacity(state.live.len()) {
                self.factory
                    .resolve(&name)
                    .inspect_err(|e| debug!(objective = %name, error = %e, "admission deferred"))
                    .ok()
            } else {
                None
            };
            match resolution {
                Some(resolution) => self.admit(&mut state, name, &resolution, &mut report),
                None => {
                    state.admission.enqueue(name.clone());
                    report.queued.push(name);
                }
            }
        }

        while self.admit_next(&mut state, &mut report) {}

        if state.admission.has_capacity(state.live.len()) && state.admission.pending_len() > 0 {
            report.deferred = state.admission.pending();
            warn!(
                objectives = ?report.deferred,
                "admission deferred: no representation resolvable"
            );
        }

        state.tracker.commit(completed);
        report
    }

    /// Admit the earliest pending name that resolves, if a slot is free.
    fn admit_next(&self, state: &mut LifecycleState, report: &mut ReconcileReport) -> bool {
        if !state.admission.has_capacity(state.live.len()) {
            return false;
        }
        let factory = &self.factory;
        match state.admission.take_first(|name| factory.resolve(name).ok()) {
            Some((name, resolution)) => {
                self.admit(state, name, &resolution, report);
                true
            }
            None => false,
        }
    }

    fn admit(
        &self,
        state: &mut LifecycleState,
        name: String,
        resolution: &Resolution,
        report: &mut ReconcileReport,
    ) {
        let handle = self.factory.create(&name, resolution, &self.parent);
        if resolution.kind.is_degraded() {
            warn!(
                objective = %name,
                representation = %resolution.representation,
                "using default representation"
            );
            report.degraded.push(name.clone());
        }
        info!(objective = %name, kind = ?resolution.kind, "instance admitted");
        state.live.insert(name.clone(), handle);
        report.admitted.push(name);
    }

    /// Destroy every live instance and forget all state. Returns the number
    /// of instances destroyed.
    pub async fn shutdown(&self) -> usize {
        let mut state = self.state.lock().await;
        let count = state.live.len();
        for (name, handle) in state.live.drain() {
            debug!(objective = %name, "instance destroyed on shutdown");
            self.factory.destroy(handle);
        }
        state.admission.clear();
        state.tracker.clear();
        info!(destroyed = count, "instance lifecycle shut down");
        count
    }

    pub async fn snapshot(&self) -> LifecycleSnapshot {
        let state = self.state.lock().await;
        let mut live: Vec<LiveInstance> = state
            .live
            .iter()
            .map(|(objective, handle)| LiveInstance {
                objective: objective.clone(),
                handle: handle.clone(),
            })
            .collect();
        live.sort_by(|a, b| a.objective.cmp(&b.objective));

        LifecycleSnapshot {
            capacity: state.admission.capacity(),
            live,
            pending: state.admission.pending(),
            completed: state.tracker.completed().to_vec(),
        }
    }

    pub async fn live_count(&self) -> usize {
        self.state.lock().await.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::factory::CatalogInstanceFactory;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn live_names(snapshot: &LifecycleSnapshot) -> Vec<String> {
        snapshot.live.iter().map(|l| l.objective.clone()).collect()
    }

    fn controller(
        catalog: &[&str],
        default: Option<&str>,
    ) -> (InstanceLifecycleController, Arc<CatalogInstanceFactory>) {
        let factory = Arc::new(CatalogInstanceFactory::new(
            catalog.iter().copied(),
            default.map(str::to_string),
        ));
        let controller = InstanceLifecycleController::new(
            Arc::clone(&factory) as Arc<dyn InstanceFactory>,
            3,
            InstanceParent::default(),
        );
        (controller, factory)
    }

    #[tokio::test]
    async fn test_fills_capacity_then_queues() {
        let (controller, factory) = controller(&["A", "B", "C", "D"], None);

        let report = controller.reconcile(names(&["A", "B", "C", "D"])).await;

        assert_eq!(report.admitted, names(&["A", "B", "C"]));
        assert_eq!(report.queued, names(&["D"]));
        let snapshot = controller.snapshot().await;
        assert_eq!(live_names(&snapshot), names(&["A", "B", "C"]));
        assert_eq!(snapshot.pending, names(&["D"]));
        assert_eq!(factory.live_count(), 3);
    }

    #[tokio::test]
    async fn test_eviction_admits_pending_head() {
        let (controller, factory) = controller(&["A", "B", "C", "D"], None);
        controller.reconcile(names(&["A", "B", "C", "D"])).await;

        let report = controller.reconcile(names(&["A", "C", "D"])).await;

        assert_eq!(report.evicted, names(&["B"]));
        assert_eq!(report.admitted, names(&["D"]));
        let snapshot = controller.snapshot().await;
        assert_eq!(live_names(&snapshot), names(&["A", "C", "D"]));
        assert!(snapshot.pending.is_empty());
        assert_eq!(factory.live_count(), 3);
    }

    #[tokio::test]
    async fn test_unchanged_poll_is_idempotent() {
        let (controller, factory) = controller(&["A", "B"], None);
        controller.reconcile(names(&["A", "B"])).await;
        let handles_before = controller.snapshot().await.live;

        let report = controller.reconcile(names(&["A", "B"])).await;

        assert!(report.is_noop());
        assert_eq!(controller.snapshot().await.live, handles_before);
        assert_eq!(factory.live_count(), 2);
    }

    #[tokio::test]
    async fn test_eviction_precedes_admission_within_tick() {
        let (controller, _) = controller(&["A", "B", "C", "D", "E"], None);
        controller.reconcile(names(&["A", "B", "C", "D"])).await;

        let report = controller.reconcile(names(&["A", "C", "D", "E"])).await;

        assert_eq!(report.evicted, names(&["B"]));
        assert_eq!(report.admitted, names(&["D"]));
        assert_eq!(report.queued, names(&["E"]));
        let snapshot = controller.snapshot().await;
        assert_eq!(live_names(&snapshot), names(&["A", "C", "D"]));
        assert_eq!(snapshot.pending, names(&["E"]));
    }

    #[tokio::test]
    async fn test_pending_name_removed_is_dropped() {
        let (controller, _) = controller(&["A", "B", "C", "D", "E"], None);
        controller.reconcile(names(&["A", "B", "C", "D", "E"])).await;

        let report = controller.reconcile(names(&["A", "B", "C", "E"])).await;

        assert_eq!(report.dropped, names(&["D"]));
        assert!(report.evicted.is_empty());
        assert_eq!(controller.snapshot().await.pending, names(&["E"]));
    }

    /// Records every `create` so transient instances are visible.
    struct RecordingFactory {
        inner: CatalogInstanceFactory,
        created: std::sync::Mutex<Vec<String>>,
    }

    impl InstanceFactory for RecordingFactory {
        fn resolve(&self, objective: &str) -> crate::domain::errors::SyncResult<Resolution> {
            self.inner.resolve(objective)
        }

        fn create(
            &self,
            objective: &str,
            resolution: &Resolution,
            parent: &InstanceParent,
        ) -> InstanceHandle {
            self.created.lock().unwrap().push(objective.to_string());
            self.inner.create(objective, resolution, parent)
        }

        fn destroy(&self, handle: InstanceHandle) {
            self.inner.destroy(handle);
        }
    }

    #[tokio::test]
    async fn test_pending_name_removed_with_eviction_is_never_admitted() {
        let factory = Arc::new(RecordingFactory {
            inner: CatalogInstanceFactory::new(["A", "B", "C", "D"], None),
            created: std::sync::Mutex::new(Vec::new()),
        });
        let controller = InstanceLifecycleController::new(
            Arc::clone(&factory) as Arc<dyn InstanceFactory>,
            3,
            InstanceParent::default(),
        );
        controller.reconcile(names(&["A", "B", "C", "D"])).await;

        let report = controller.reconcile(names(&["A", "C"])).await;

        assert_eq!(report.evicted, names(&["B"]));
        assert_eq!(report.dropped, names(&["D"]));
        assert!(report.admitted.is_empty());
        assert_eq!(*factory.created.lock().unwrap(), names(&["A", "B", "C"]));
        let snapshot = controller.snapshot().await;
        assert_eq!(live_names(&snapshot), names(&["A", "C"]));
        assert!(snapshot.pending.is_empty());
        assert_eq!(factory.inner.live_count(), 2);
    }

    #[tokio::test]
    async fn test_fifo_admission_order() {
        let (controller, _) = controller(&["A", "B", "C", "X", "Y"], None);
        controller.reconcile(names(&["A", "B", "C"])).await;
        controller.reconcile(names(&["A", "B", "C", "X"])).await;
        controller.reconcile(names(&["A", "B", "C", "X", "Y"])).await;
        assert_eq!(controller.snapshot().await.pending, names(&["X", "Y"]));

        let report = controller.reconcile(names(&["B", "C", "X", "Y"])).await;

        assert_eq!(report.admitted, names(&["X"]));
        assert_eq!(controller.snapshot().await.pending, names(&["Y"]));
    }

    #[tokio::test]
    async fn test_default_representation_is_degraded_admission() {
        let (controller, factory) = controller(&["A"], Some("Placeholder"));

        let report = controller.reconcile(names(&["A", "Mystery"])).await;

        assert_eq!(report.admitted, names(&["A", "Mystery"]));
        assert_eq!(report.degraded, names(&["Mystery"]));
        let handles = factory.live_handles();
        assert!(handles
            .iter()
            .any(|h| h.objective == "Mystery" && h.representation.name() == "Placeholder"));
    }

    #[tokio::test]
    async fn test_case_insensitive_representation() {
        let (controller, factory) = controller(&["Door"], None);

        let report = controller.reconcile(names(&["door"])).await;

        assert_eq!(report.admitted, names(&["door"]));
        assert_eq!(factory.live_handles()[0].representation.name(), "Door");
    }

    #[tokio::test]
    async fn test_unresolvable_name_stays_pending_and_is_skipped() {
        let (controller, _) = controller(&["A"], None);

        let report = controller.reconcile(names(&["Mystery", "A"])).await;

        assert_eq!(report.admitted, names(&["A"]));
        assert_eq!(report.queued, names(&["Mystery"]));
        assert_eq!(report.deferred, names(&["Mystery"]));
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.pending, names(&["Mystery"]));

        // Still deferred on later ticks, and leaves once it stops being completed
        let report = controller.reconcile(names(&["Mystery", "A"])).await;
        assert_eq!(report.deferred, names(&["Mystery"]));
        let report = controller.reconcile(names(&["A"])).await;
        assert_eq!(report.dropped, names(&["Mystery"]));
        assert!(report.deferred.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_destroys_all_instances() {
        let (controller, factory) = controller(&["A", "B", "C", "D"], None);
        controller.reconcile(names(&["A", "B", "C", "D"])).await;

        assert_eq!(controller.shutdown().await, 3);

        assert_eq!(factory.live_count(), 0);
        let snapshot = controller.snapshot().await;
        assert!(snapshot.live.is_empty());
        assert!(snapshot.pending.is_empty());
        assert!(snapshot.completed.is_empty());
    }
}
