//! ListTasks command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::repository::TaskRepository;
use crate::types::{EpicId, ProjectId, TaskStatus};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// List tasks of an epic or a whole project in board order
#[operation(verb = "list", noun = "task", description = "List tasks of an epic or project, ordered by status and position")]
#[derive(Debug, Default, Deserialize)]
pub struct ListTasks {
    /// Only tasks of this epic
    pub epic_id: Option<EpicId>,
    /// All tasks of this project, when no epic is given
    pub project_id: Option<ProjectId>,
    /// Only tasks with this status
    #[param(alias = "column")]
    pub status: Option<TaskStatus>,
}

impl ListTasks {
    pub fn for_epic(epic_id: impl Into<EpicId>) -> Self {
        Self {
            epic_id: Some(epic_id.into()),
            ..Default::default()
        }
    }

    pub fn for_project(project_id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListTasks {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            let repo = store.tasks();
            let tasks = match (&self.epic_id, &self.project_id) {
                (Some(epic_id), _) => {
                    store.require_epic(epic_id)?;
                    repo.list_by_epic(epic_id)?
                }
                (None, Some(project_id)) => {
                    store.require_project(project_id)?;
                    repo.list_by_project(project_id)?
                }
                (None, None) => return Err(TrackerError::missing_field("epic_id")),
            };

            let tasks: Vec<_> = tasks
                .into_iter()
                .filter(|t| self.status.is_none_or(|s| t.status == s))
                .collect();
            Ok(json!({ "count": tasks.len(), "tasks": tasks }))
        });
        ExecutionResult::unlogged(result)
    }
}
