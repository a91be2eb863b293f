//! AddTask command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::ledger::PositionLedger;
use crate::types::{EpicId, NewTask, TaskStatus, UserId};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Add a task to the end of its status column
#[operation(verb = "add", noun = "task", description = "Create a task at the end of its status column")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddTask {
    /// The epic the task belongs to
    pub epic_id: EpicId,
    /// Task title
    #[param(alias = "name")]
    pub title: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial status, backlog when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Creating user; must be a project member
    pub actor: Option<UserId>,
}

impl AddTask {
    pub fn new(epic_id: impl Into<EpicId>, title: impl Into<String>) -> Self {
        Self {
            epic_id: epic_id.into(),
            title: title.into(),
            description: None,
            status: None,
            actor: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AddTask {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let title = self.title.trim();
            if title.is_empty() {
                return Err(TrackerError::invalid_value("title", "must not be empty"));
            }

            let task = ctx.write_transaction(|store| {
                let epic = store.require_epic(&self.epic_id)?;
                store.authorize(&epic.project_id, self.actor.as_ref(), false)?;

                PositionLedger::new(&store.tasks()).append(&NewTask {
                    epic_id: self.epic_id.clone(),
                    title: title.to_string(),
                    description: self.description.clone().unwrap_or_default(),
                    status: self.status.unwrap_or_default(),
                    creator_user_id: self.actor.clone(),
                })
            })?;

            info!(
                task = %task.id,
                epic = %task.epic_id,
                status = %task.status,
                position = task.position,
                "task created"
            );
            Ok(serde_json::to_value(&task)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}
