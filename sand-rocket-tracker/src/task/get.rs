//! GetTask command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::TaskId;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::Value;

/// Get a task by ID with its attachments
#[operation(verb = "get", noun = "task", description = "Retrieve a task by ID with its attachments")]
#[derive(Debug, Deserialize)]
pub struct GetTask {
    /// The task ID to retrieve
    pub id: TaskId,
}

impl GetTask {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for GetTask {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            let task = store.require_task(&self.id)?;
            let mut value = serde_json::to_value(&task)?;
            value["attachments"] = serde_json::to_value(store.list_attachments(&self.id)?)?;
            Ok(value)
        });
        ExecutionResult::unlogged(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{add_task, fixture};

    #[tokio::test]
    async fn test_get_task() {
        let f = fixture().await;
        let id = add_task(&f.ctx, &f.epic, "Fuel pump").await;

        let result = GetTask::new(id).execute(&f.ctx).await.into_result().unwrap();
        assert_eq!(result["title"], "Fuel pump");
        assert_eq!(result["position"], 0);
        assert!(result["attachments"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_task() {
        let f = fixture().await;
        let result = GetTask::new("missing").execute(&f.ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::TaskNotFound { .. })));
    }
}
