//! DeleteAttachment command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{AttachmentId, UserId};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Remove an attachment's metadata. The referenced file is left alone.
#[operation(verb = "delete", noun = "attachment", description = "Delete an attachment")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteAttachment {
    /// The attachment ID
    pub id: AttachmentId,
    /// Acting user; must be a project member
    pub actor: Option<UserId>,
}

impl DeleteAttachment {
    pub fn new(id: impl Into<AttachmentId>) -> Self {
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
impl Execute<TrackerContext, TrackerError> for DeleteAttachment {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let task_id = ctx.write_transaction(|store| {
                let attachment = store
                    .get_attachment(&self.id)?
                    .ok_or_else(|| TrackerError::not_found("attachment", self.id.as_str()))?;
                let task = store.require_task(&attachment.task_id)?;
                let epic = store.require_epic(&task.epic_id)?;
                store.authorize(&epic.project_id, self.actor.as_ref(), false)?;
                store.delete_attachment(&self.id)?;
                Ok(task.id)
            })?;
            Ok(json!({ "deleted": true, "id": self.id, "task_id": task_id }))
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::{AddAttachment, ListAttachments};
    use crate::test_support::{add_task, fixture};

    #[tokio::test]
    async fn test_delete_attachment() {
        let f = fixture().await;
        let task = add_task(&f.ctx, &f.epic, "Fuel pump").await;
        let added = AddAttachment::new(task.clone(), "a.pdf", "a.pdf")
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        let result = DeleteAttachment::new(added["id"].as_str().unwrap())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["deleted"], true);

        let listed = ListAttachments::new(task)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(listed["count"], 0);

        let again = DeleteAttachment::new(added["id"].as_str().unwrap())
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(again, Err(TrackerError::NotFound { .. })));
    }
}
