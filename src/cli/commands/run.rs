//! `run`: drive the synchronization core until Ctrl-C.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::{CatalogInstanceFactory, HttpObjectiveClient};
use crate::services::{SchedulerStatus, SyncContext, SyncScheduler};

#[derive(Debug, Serialize)]
pub struct RunSummaryOutput {
    pub destroyed_instances: usize,
    pub status: SchedulerStatus,
}

impl CommandOutput for RunSummaryOutput {
    fn to_human(&self) -> String {
        let line = |name: &str, s: &crate::services::TaskStatus| {
            format!(
                "{name}: {} runs, {} failed{}",
                s.runs,
                s.failures,
                s.last_error
                    .as_ref()
                    .map(|e| format!(" (last error: {e})"))
                    .unwrap_or_default()
            )
        };
        [
            format!("Stopped. Destroyed {} live instance(s).", self.destroyed_instances),
            line("full sync", &self.status.full_sync),
            line("completion poll", &self.status.completion_poll),
        ]
        .join("\n")
    }
}

pub async fn execute(
    mut config: Config,
    poll_interval_ms: Option<u64>,
    capacity: Option<usize>,
    json_mode: bool,
) -> Result<()> {
    if let Some(poll_interval_ms) = poll_interval_ms {
        config.sync.poll_interval_ms = poll_interval_ms;
    }
    if let Some(capacity) = capacity {
        config.instances.capacity = capacity;
    }
    crate::infrastructure::config::ConfigLoader::validate(&config)?;

    let client = Arc::new(
        HttpObjectiveClient::new(config.remote.clone().into())
            .context("Failed to create remote client")?,
    );
    let factory = Arc::new(CatalogInstanceFactory::from_config(&config.instances));

    info!(
        base_url = %config.remote.base_url,
        capacity = config.instances.capacity,
        representations = config.instances.representations.len(),
        "starting objective sync"
    );

    let ctx = Arc::new(SyncContext::new(config, client, factory));
    let mut scheduler = SyncScheduler::new(ctx);
    scheduler.start();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("shutdown requested");

    let status = scheduler.status().await;
    let destroyed_instances = scheduler.shutdown().await;

    output(
        &RunSummaryOutput {
            destroyed_instances,
            status,
        },
        json_mode,
    );
    Ok(())
}
