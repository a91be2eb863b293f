//! UpdateTask command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::repository::TaskRepository;
use crate::types::{TaskId, TaskPatch, UserId};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Update a task's text. Placement changes go through `move task`.
#[operation(verb = "update", noun = "task", description = "Update a task's title or description")]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateTask {
    /// The task ID to update
    pub id: TaskId,
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// Editing user; must be a project member
    #[param(alias = "edited_by")]
    pub actor: Option<UserId>,
}

impl UpdateTask {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            actor: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for UpdateTask {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let title = match &self.title {
                Some(title) if title.trim().is_empty() => {
                    return Err(TrackerError::invalid_value("title", "must not be empty"))
                }
                Some(title) => Some(title.trim().to_string()),
                None => None,
            };

            let task = ctx.write_transaction(|store| {
                let task = store.require_task(&self.id)?;
                let epic = store.require_epic(&task.epic_id)?;
                store.authorize(&epic.project_id, self.actor.as_ref(), false)?;

                let patch = TaskPatch {
                    title,
                    description: self.description.clone(),
                    ..TaskPatch::new(self.id.clone())
                }
                .with_edited_by(self.actor.clone());

                store
                    .tasks()
                    .update(&patch)?
                    .ok_or_else(|| TrackerError::TaskNotFound {
                        id: self.id.to_string(),
                    })
            })?;
            Ok(serde_json::to_value(&task)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}
