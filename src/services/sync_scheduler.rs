//! Periodic full sync and completion poll.
//!
//! Each task owns its own cancellation token. Cancelling interrupts the sleep
//! between ticks; a request already in flight is allowed to finish.

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::context::SyncContext;
use crate::domain::errors::SyncResult;

/// Which periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    FullSync,
    CompletionPoll,
}

impl TaskKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullSync => "full_sync",
            Self::CompletionPoll => "completion_poll",
        }
    }
}

/// Counters for one periodic task.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskStatus {
    pub running: bool,
    pub runs: u64,
    pub successes: u64,
    pub failures: u64,
    pub consecutive_failures: u32,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Status of both periodic tasks.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub full_sync: TaskStatus,
    pub completion_poll: TaskStatus,
}

/// Sleep between ticks: the fixed period, or a growing delay after
/// consecutive failures when a backoff ceiling is configured.
struct TickDelay {
    period: Duration,
    backoff: Option<ExponentialBackoff>,
}

impl TickDelay {
    fn new(period: Duration, ceiling: Option<Duration>) -> Self {
        let backoff = ceiling.map(|max| {
            ExponentialBackoffBuilder::new()
                .with_initial_interval(period)
                .with_multiplier(2.0)
                .with_randomization_factor(0.0)
                .with_max_interval(max.max(period))
                .with_max_elapsed_time(None)
                .build()
        });
        Self { period, backoff }
    }

    fn after_success(&mut self) -> Duration {
        if let Some(backoff) = self.backoff.as_mut() {
            backoff.reset();
        }
        self.period
    }

    fn after_failure(&mut self) -> Duration {
        self.backoff
            .as_mut()
            .and_then(Backoff::next_backoff)
            .unwrap_or(self.period)
    }
}

struct PeriodicTask {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl PeriodicTask {
    async fn stop(self, kind: TaskKind) {
        self.token.cancel();
        if let Err(e) = self.join.await {
            error!(task = kind.as_str(), error = %e, "periodic task ended abnormally");
        }
    }
}

fn spawn_periodic<F, Fut>(
    kind: TaskKind,
    period: Duration,
    backoff_ceiling: Option<Duration>,
    status: Arc<RwLock<TaskStatus>>,
    tick: F,
) -> PeriodicTask
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = SyncResult<()>> + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let join = tokio::spawn(async move {
        status.write().await.running = true;
        info!(
            task = kind.as_str(),
            period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "periodic task started"
        );

        let mut delay = TickDelay::new(period, backoff_ceiling);

        while !cancelled.is_cancelled() {
            // Only effective with `panic = "unwind"`; the release profile aborts
            let outcome = match AssertUnwindSafe(tick()).catch_unwind().await {
                Ok(outcome) => outcome.map_err(|e| e.to_string()),
                Err(_) => Err("tick panicked".to_string()),
            };

            let sleep_for = {
                let mut status = status.write().await;
                status.runs += 1;
                match outcome {
                    Ok(()) => {
                        status.successes += 1;
                        status.consecutive_failures = 0;
                        status.last_success = Some(Utc::now());
                        delay.after_success()
                    }
                    Err(e) => {
                        status.failures += 1;
                        status.consecutive_failures += 1;
                        let sleep_for = delay.after_failure();
                        warn!(
                            task = kind.as_str(),
                            consecutive_failures = status.consecutive_failures,
                            retry_in_ms = u64::try_from(sleep_for.as_millis()).unwrap_or(u64::MAX),
                            error = %e,
                            "periodic tick failed"
                        );
                        status.last_error = Some(e);
                        sleep_for
                    }
                }
            };

            tokio::select! {
                () = cancelled.cancelled() => break,
                () = tokio::time::sleep(sleep_for) => {}
            }
        }

        status.write().await.running = false;
        info!(task = kind.as_str(), "periodic task stopped");
    });

    PeriodicTask { token, join }
}

/// Drives the full sync and the completion poll.
pub struct SyncScheduler {
    ctx: Arc<SyncContext>,
    full_sync: Option<PeriodicTask>,
    completion_poll: Option<PeriodicTask>,
    full_sync_status: Arc<RwLock<TaskStatus>>,
    poll_status: Arc<RwLock<TaskStatus>>,
}

impl SyncScheduler {
    pub fn new(ctx: Arc<SyncContext>) -> Self {
        Self {
            ctx,
            full_sync: None,
            completion_poll: None,
            full_sync_status: Arc::new(RwLock::new(TaskStatus::default())),
            poll_status: Arc::new(RwLock::new(TaskStatus::default())),
        }
    }

    pub const fn context(&self) -> &Arc<SyncContext> {
        &self.ctx
    }

    fn backoff_ceiling(&self) -> Option<Duration> {
        self.ctx
            .config
            .sync
            .backoff
            .enabled
            .then(|| self.ctx.config.backoff_ceiling())
    }

    /// Start both tasks.
    pub fn start(&mut self) {
        self.start_full_sync();
        self.start_completion_poll();
    }

    /// Start the full sync; no-op if already running.
    pub fn start_full_sync(&mut self) {
        if self.full_sync.is_some() {
            return;
        }
        let ctx = Arc::clone(&self.ctx);
        self.full_sync = Some(spawn_periodic(
            TaskKind::FullSync,
            self.ctx.config.full_sync_interval(),
            self.backoff_ceiling(),
            Arc::clone(&self.full_sync_status),
            move || {
                let ctx = Arc::clone(&ctx);
                async move { ctx.full_sync_once().await.map(|_| ()) }
            },
        ));
    }

    /// Start the completion poll; no-op if already running.
    pub fn start_completion_poll(&mut self) {
        if self.completion_poll.is_some() {
            return;
        }
        let ctx = Arc::clone(&self.ctx);
        self.completion_poll = Some(spawn_periodic(
            TaskKind::CompletionPoll,
            self.ctx.config.poll_interval(),
            self.backoff_ceiling(),
            Arc::clone(&self.poll_status),
            move || {
                let ctx = Arc::clone(&ctx);
                async move { ctx.poll_once().await.map(|_| ()) }
            },
        ));
    }

    /// Cancel the full sync and wait for it to exit.
    pub async fn stop_full_sync(&mut self) {
        if let Some(task) = self.full_sync.take() {
            task.stop(TaskKind::FullSync).await;
        }
    }

    /// Cancel the completion poll and wait for it to exit.
    pub async fn stop_completion_poll(&mut self) {
        if let Some(task) = self.completion_poll.take() {
            task.stop(TaskKind::CompletionPoll).await;
        }
    }

    pub async fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            full_sync: self.full_sync_status.read().await.clone(),
            completion_poll: self.poll_status.read().await.clone(),
        }
    }

    /// Cancel both tasks, then destroy every live instance. Returns the
    /// number of instances destroyed.
    pub async fn shutdown(mut self) -> usize {
        self.stop_full_sync().await;
        self.stop_completion_poll().await;
        self.ctx.lifecycle.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay_without_backoff() {
        let mut delay = TickDelay::new(Duration::from_secs(30), None);
        assert_eq!(delay.after_failure(), Duration::from_secs(30));
        assert_eq!(delay.after_failure(), Duration::from_secs(30));
        assert_eq!(delay.after_success(), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_grows_to_ceiling_and_resets() {
        let mut delay = TickDelay::new(Duration::from_secs(1), Some(Duration::from_secs(4)));
        assert_eq!(delay.after_failure(), Duration::from_secs(1));
        assert_eq!(delay.after_failure(), Duration::from_secs(2));
        assert_eq!(delay.after_failure(), Duration::from_secs(4));
        assert_eq!(delay.after_failure(), Duration::from_secs(4));
        assert_eq!(delay.after_success(), Duration::from_secs(1));
        assert_eq!(delay.after_failure(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_panicking_tick_counts_as_failure_and_task_survives() {
        let status = Arc::new(RwLock::new(TaskStatus::default()));
        let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let task = spawn_periodic(
            TaskKind::CompletionPoll,
            Duration::from_millis(10),
            None,
            Arc::clone(&status),
            move || {
                let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                async move {
                    assert!(n != 0, "first tick explodes");
                    Ok(())
                }
            },
        );

        for _ in 0..200 {
            if status.read().await.successes > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        task.stop(TaskKind::CompletionPoll).await;

        let status = status.read().await;
        assert_eq!(status.failures, 1);
        assert!(status.successes >= 1);
        assert_eq!(status.last_error.as_deref(), Some("tick panicked"));
        assert!(!status.running);
    }

    #[test]
    fn test_task_kind_names() {
        assert_eq!(TaskKind::FullSync.as_str(), "full_sync");
        assert_eq!(TaskKind::CompletionPoll.as_str(), "completion_poll");
    }
}
