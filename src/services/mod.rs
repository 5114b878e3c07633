//! Service layer: the synchronization core.
//!
//! - `ProgressCache`: local completion flags with optimistic writes
//! - `CompletionTracker`: completed-set snapshot and diff
//! - `AdmissionController`: capacity and FIFO backlog
//! - `InstanceLifecycleController`: admission and eviction of live instances
//! - `SyncScheduler`: the two periodic tasks
//! - `SyncContext`: shared state handed to all of the above

pub mod admission;
pub mod completion_tracker;
pub mod context;
pub mod lifecycle;
pub mod progress_cache;
pub mod sync_scheduler;

pub use admission::{AdmissionController, DEFAULT_CAPACITY};
pub use completion_tracker::{CompletionDiff, CompletionTracker};
pub use context::SyncContext;
pub use lifecycle::{InstanceLifecycleController, LifecycleSnapshot, LiveInstance, ReconcileReport};
pub use progress_cache::{BulkReplaceReport, ProgressCache};
pub use sync_scheduler::{SchedulerStatus, SyncScheduler, TaskKind, TaskStatus};
