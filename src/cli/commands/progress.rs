//! `complete`, `reset`, `completed` and `pending`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::domain::ports::{InstanceFactory, ObjectiveClient};
use crate::infrastructure::{CatalogInstanceFactory, HttpObjectiveClient};
use crate::services::SyncContext;

#[derive(Debug, Serialize)]
pub struct ProgressActionOutput {
    pub objective: String,
    pub completed: bool,
    pub changed: bool,
}

impl CommandOutput for ProgressActionOutput {
    fn to_human(&self) -> String {
        let state = if self.completed { "completed" } else { "not completed" };
        if self.changed {
            format!("Marked '{}' {state}.", self.objective)
        } else {
            format!("'{}' is already {state}.", self.objective)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NameListOutput {
    pub completed: bool,
    pub names: Vec<String>,
}

impl CommandOutput for NameListOutput {
    fn to_human(&self) -> String {
        if self.names.is_empty() {
            return if self.completed {
                "No completed objectives.".to_string()
            } else {
                "No pending objectives.".to_string()
            };
        }
        self.names
            .iter()
            .map(|n| format!("  - {n}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Optimistically write one flag through a freshly synced cache and wait for
/// the push to land.
pub async fn set_progress(
    config: Config,
    name: String,
    value: bool,
    json_mode: bool,
) -> Result<()> {
    let client: Arc<dyn ObjectiveClient> =
        Arc::new(HttpObjectiveClient::new(config.remote.clone().into())?);
    let factory: Arc<dyn InstanceFactory> = Arc::new(CatalogInstanceFactory::default());
    let ctx = SyncContext::new(config, client, factory);

    ctx.full_sync_once()
        .await
        .context("Failed to fetch current progress")?;

    let changed = match ctx.cache.set(&name, value).await {
        Some(push) => {
            push.await
                .context("Progress push task failed")?
                .context("Remote rejected the update; local value rolled back")?;
            true
        }
        None => false,
    };

    output(
        &ProgressActionOutput {
            objective: name,
            completed: value,
            changed,
        },
        json_mode,
    );
    Ok(())
}

pub async fn list_by_completion(config: &Config, completed: bool, json_mode: bool) -> Result<()> {
    let client = HttpObjectiveClient::new(config.remote.clone().into())?;
    let names = client
        .fetch_by_completion(completed)
        .await
        .context("Failed to fetch objectives by completion")?;

    output(&NameListOutput { completed, names }, json_mode);
    Ok(())
}
