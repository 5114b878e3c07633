//! `status`: list every objective.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{objectives_table, output, CommandOutput};
use crate::domain::models::{Config, ObjectiveRecord};
use crate::domain::ports::ObjectiveClient;
use crate::infrastructure::HttpObjectiveClient;

#[derive(Debug, Serialize)]
pub struct ObjectiveListOutput {
    pub objectives: Vec<ObjectiveRecord>,
    pub total: usize,
    pub completed: usize,
}

impl ObjectiveListOutput {
    pub fn new(mut objectives: Vec<ObjectiveRecord>) -> Self {
        objectives.sort_by_key(|o| (o.order, o.id));
        let completed = objectives.iter().filter(|o| o.progress).count();
        Self {
            total: objectives.len(),
            completed,
            objectives,
        }
    }
}

impl CommandOutput for ObjectiveListOutput {
    fn to_human(&self) -> String {
        if self.objectives.is_empty() {
            return "No objectives found.".to_string();
        }
        format!(
            "{}\n{} of {} objective(s) completed",
            objectives_table(&self.objectives),
            self.completed,
            self.total
        )
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let client = HttpObjectiveClient::new(config.remote.clone().into())?;
    let objectives = client
        .fetch_all()
        .await
        .context("Failed to fetch objectives")?;

    output(&ObjectiveListOutput::new(objectives), json_mode);
    Ok(())
}
