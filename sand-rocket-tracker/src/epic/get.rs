//! GetEpic command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::repository::TaskRepository;
use crate::types::{EpicId, TaskStatus};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// Get an epic with per-status task counts
#[operation(verb = "get", noun = "epic", description = "Retrieve an epic with task counts per status")]
#[derive(Debug, Deserialize)]
pub struct GetEpic {
    /// The epic ID
    pub id: EpicId,
}

impl GetEpic {
    pub fn new(id: impl Into<EpicId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for GetEpic {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            let epic = store.require_epic(&self.id)?;
            let tasks = store.tasks().list_by_epic(&self.id)?;

            let mut counts = serde_json::Map::new();
            for status in TaskStatus::ALL {
                let n = tasks.iter().filter(|t| t.status == status).count();
                counts.insert(status.to_string(), json!(n));
            }

            let mut value = serde_json::to_value(&epic)?;
            value["task_counts"] = Value::Object(counts);
            Ok(value)
        });
        ExecutionResult::unlogged(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::MoveTask;
    use crate::test_support::{add_task, fixture};

    #[tokio::test]
    async fn test_get_epic_counts() {
        let f = fixture().await;
        add_task(&f.ctx, &f.epic, "A").await;
        let b = add_task(&f.ctx, &f.epic, "B").await;
        MoveTask::new(b, TaskStatus::Done)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        let result = GetEpic::new(f.epic.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["name"], "Engines");
        assert_eq!(result["task_counts"]["backlog"], 1);
        assert_eq!(result["task_counts"]["in_progress"], 0);
        assert_eq!(result["task_counts"]["done"], 1);
    }

    #[tokio::test]
    async fn test_get_missing_epic() {
        let f = fixture().await;
        let result = GetEpic::new("missing").execute(&f.ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::EpicNotFound { .. })));
    }
}
