//! Mock objective client for testing and offline runs

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::ObjectiveRecord;
use crate::domain::ports::ObjectiveClient;

#[derive(Debug, Default)]
struct MockState {
    objectives: Vec<ObjectiveRecord>,
    fetch_all_failures: u32,
    completion_failures: u32,
    reject_pushes: bool,
    pushes: Vec<(String, bool)>,
    fetch_all_calls: usize,
    completion_calls: usize,
}

/// In-memory remote with scriptable failures.
///
/// Accepted pushes update the stored objective, so later fetches observe them.
#[derive(Debug, Default)]
pub struct MockObjectiveClient {
    state: Mutex<MockState>,
}

impl MockObjectiveClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objectives(objectives: Vec<ObjectiveRecord>) -> Self {
        Self {
            state: Mutex::new(MockState {
                objectives,
                ..MockState::default()
            }),
        }
    }

    /// Build from `(name, completed)` pairs; ids follow list order from 1.
    pub fn with_progress(progress: &[(&str, bool)]) -> Self {
        Self::with_objectives(
            progress
                .iter()
                .zip(1..)
                .map(|((name, done), id)| ObjectiveRecord::new(id, *name, *done))
                .collect(),
        )
    }

    pub async fn set_objectives(&self, objectives: Vec<ObjectiveRecord>) {
        self.state.lock().await.objectives = objectives;
    }

    /// Mark exactly `names` as completed, appending unknown names in order.
    pub async fn set_completed(&self, names: &[&str]) {
        let mut state = self.state.lock().await;
        for objective in &mut state.objectives {
            objective.progress = objective
                .name
                .as_deref()
                .is_some_and(|n| names.contains(&n));
        }
        for name in names {
            if !state
                .objectives
                .iter()
                .any(|o| o.name.as_deref() == Some(*name))
            {
                let id = i64::try_from(state.objectives.len()).unwrap_or(i64::MAX) + 1;
                state.objectives.push(ObjectiveRecord::new(id, *name, true));
            }
        }
    }

    /// Fail the next `n` fetch-all calls with a transport error.
    pub async fn fail_next_fetch_all(&self, n: u32) {
        self.state.lock().await.fetch_all_failures = n;
    }

    /// Fail the next `n` completion-filter calls with a transport error.
    pub async fn fail_next_completion_fetches(&self, n: u32) {
        self.state.lock().await.completion_failures = n;
    }

    pub async fn reject_pushes(&self, reject: bool) {
        self.state.lock().await.reject_pushes = reject;
    }

    /// Pushes the remote accepted, in arrival order.
    pub async fn pushes(&self) -> Vec<(String, bool)> {
        self.state.lock().await.pushes.clone()
    }

    pub async fn fetch_all_calls(&self) -> usize {
        self.state.lock().await.fetch_all_calls
    }

    pub async fn completion_calls(&self) -> usize {
        self.state.lock().await.completion_calls
    }
}

#[async_trait]
impl ObjectiveClient for MockObjectiveClient {
    async fn fetch_all(&self) -> SyncResult<Vec<ObjectiveRecord>> {
        let mut state = self.state.lock().await;
        state.fetch_all_calls += 1;
        if state.fetch_all_failures > 0 {
            state.fetch_all_failures -= 1;
            return Err(SyncError::Transport("mock: connection refused".to_string()));
        }
        Ok(state.objectives.clone())
    }

    async fn fetch_by_completion(&self, completed: bool) -> SyncResult<Vec<String>> {
        let mut state = self.state.lock().await;
        state.completion_calls += 1;
        if state.completion_failures > 0 {
            state.completion_failures -= 1;
            return Err(SyncError::Transport("mock: connection refused".to_string()));
        }
        Ok(state
            .objectives
            .iter()
            .filter(|o| o.progress == completed)
            .filter_map(|o| o.name.clone())
            .collect())
    }

    async fn push_progress(&self, name: &str, completed: bool) -> SyncResult<()> {
        let mut state = self.state.lock().await;
        if state.reject_pushes {
            return Err(SyncError::HttpStatus {
                status: 500,
                body: "mock: push rejected".to_string(),
            });
        }
        let objective = state
            .objectives
            .iter_mut()
            .find(|o| o.name.as_deref() == Some(name))
            .ok_or_else(|| SyncError::ObjectiveNotFound(name.to_string()))?;
        objective.progress = completed;
        state.pushes.push((name.to_string(), completed));
        Ok(())
    }
}
