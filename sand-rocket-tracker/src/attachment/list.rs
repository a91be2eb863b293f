//! ListAttachments command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::TaskId;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// List a task's attachments, oldest first
#[operation(verb = "list", noun = "attachment", description = "List attachments on a task")]
#[derive(Debug, Deserialize)]
pub struct ListAttachments {
    /// The task ID
    #[param(alias = "id")]
    pub task_id: TaskId,
}

impl ListAttachments {
    pub fn new(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListAttachments {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            store.require_task(&self.task_id)?;
            let attachments = store.list_attachments(&self.task_id)?;
            Ok(json!({
                "count": attachments.len(),
                "attachments": attachments,
            }))
        });
        ExecutionResult::unlogged(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::AddAttachment;
    use crate::test_support::{add_task, fixture};

    #[tokio::test]
    async fn test_list_attachments() {
        let f = fixture().await;
        let task = add_task(&f.ctx, &f.epic, "Fuel pump").await;
        let other = add_task(&f.ctx, &f.epic, "Valves").await;

        for name in ["a.pdf", "b.png"] {
            AddAttachment::new(task.clone(), name, name)
                .execute(&f.ctx)
                .await
                .into_result()
                .unwrap();
        }
        AddAttachment::new(other, "c.pdf", "c.pdf")
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        let result = ListAttachments::new(task)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["count"], 2);
        assert_eq!(result["attachments"][1]["mime_type"], "image/png");
    }
}
