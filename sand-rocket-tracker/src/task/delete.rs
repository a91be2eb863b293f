//! DeleteTask command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::ledger::PositionLedger;
use crate::repository::TaskRepository;
use crate::types::{TaskId, UserId};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Delete a task and close the gap it leaves in its column
#[operation(verb = "delete", noun = "task", description = "Delete a task")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteTask {
    /// The task ID to delete
    pub id: TaskId,
    /// Acting user; must be a project member
    pub actor: Option<UserId>,
}

impl DeleteTask {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            actor: None,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for DeleteTask {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let compacted = ctx.write_transaction(|store| {
                let task = store.require_task(&self.id)?;
                let epic = store.require_epic(&task.epic_id)?;
                store.authorize(&epic.project_id, self.actor.as_ref(), false)?;

                let repo = store.tasks();
                repo.delete(&self.id)?;
                PositionLedger::new(&repo).compact(&task.epic_id, task.status)
            })?;

            info!(task = %self.id, compacted = compacted.len(), "task deleted");
            Ok(json!({ "deleted": true, "id": self.id, "compacted": compacted }))
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }

    /// The deleted task plus every sibling whose position closed up
    fn affected_resource_ids(&self, result: &Value) -> Vec<String> {
        let mut ids = vec![self.id.to_string()];
        if let Some(compacted) = result.get("compacted").and_then(Value::as_array) {
            ids.extend(compacted.iter().filter_map(Value::as_str).map(String::from));
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{add_task, fixture};
    use crate::types::TaskStatus;

    #[tokio::test]
    async fn test_delete_compacts_column() {
        let f = fixture().await;
        let a = add_task(&f.ctx, &f.epic, "A").await;
        add_task(&f.ctx, &f.epic, "B").await;
        add_task(&f.ctx, &f.epic, "C").await;

        let result = DeleteTask::new(a)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["compacted"].as_array().unwrap().len(), 2);

        let column: Vec<(String, u32)> = f
            .ctx
            .read(|store| store.tasks().list_partition(&f.epic, TaskStatus::Backlog))
            .unwrap()
            .into_iter()
            .map(|t| (t.title, t.position))
            .collect();
        assert_eq!(column, vec![("B".into(), 0), ("C".into(), 1)]);
    }

    #[tokio::test]
    async fn test_delete_missing_task() {
        let f = fixture().await;
        let result = DeleteTask::new("missing").execute(&f.ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::TaskNotFound { .. })));
    }
}
