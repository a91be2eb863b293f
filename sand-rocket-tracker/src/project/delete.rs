//! DeleteProject command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{ProjectId, UserId};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Delete a project and everything in it
#[operation(verb = "delete", noun = "project", description = "Delete a project with its epics, tasks, members and invitations")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteProject {
    /// The project ID
    pub id: ProjectId,
    /// Acting user; must be an owner
    pub actor: Option<UserId>,
}

impl DeleteProject {
    pub fn new(id: impl Into<ProjectId>) -> Self {
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
impl Execute<TrackerContext, TrackerError> for DeleteProject {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            ctx.write_transaction(|store| {
                store.require_project(&self.id)?;
                store.authorize(&self.id, self.actor.as_ref(), true)?;
                store.delete_project(&self.id)
            })?;
            info!(project = %self.id, "project deleted");
            Ok(json!({ "deleted": true, "id": self.id }))
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::TaskRepository;
    use crate::test_support::{add_task, fixture};

    #[tokio::test]
    async fn test_delete_cascades() {
        let f = fixture().await;
        let task = add_task(&f.ctx, &f.epic, "Fuel pump").await;

        let result = DeleteProject::new(f.project.clone())
            .with_actor(f.owner.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["deleted"], true);

        f.ctx
            .read(|store| {
                assert!(store.get_project(&f.project)?.is_none());
                assert!(store.get_epic(&f.epic)?.is_none());
                assert!(store.tasks().get(&task)?.is_none());
                assert!(store.list_members(&f.project)?.is_empty());
                Ok(())
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_project() {
        let f = fixture().await;
        let result = DeleteProject::new("missing").execute(&f.ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::ProjectNotFound { .. })));
    }
}
