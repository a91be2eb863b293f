//! DeleteEpic command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{EpicId, UserId};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Delete an epic together with its tasks
#[operation(verb = "delete", noun = "epic", description = "Delete an epic and all of its tasks")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteEpic {
    /// The epic ID
    pub id: EpicId,
    /// Acting user; must be a project owner
    pub actor: Option<UserId>,
}

impl DeleteEpic {
    pub fn new(id: impl Into<EpicId>) -> Self {
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
impl Execute<TrackerContext, TrackerError> for DeleteEpic {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            ctx.write_transaction(|store| {
                let epic = store.require_epic(&self.id)?;
                store.authorize(&epic.project_id, self.actor.as_ref(), true)?;
                store.delete_epic(&self.id)
            })?;
            info!(epic = %self.id, "epic deleted");
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
    use crate::member::AddMember;
    use crate::repository::TaskRepository;
    use crate::test_support::{add_task, add_user, fixture};

    #[tokio::test]
    async fn test_delete_epic_removes_tasks() {
        let f = fixture().await;
        let task = add_task(&f.ctx, &f.epic, "Fuel pump").await;

        DeleteEpic::new(f.epic.clone())
            .with_actor(f.owner.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        let gone = f.ctx.read(|store| store.tasks().get(&task)).unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn test_contributor_cannot_delete_epic() {
        let f = fixture().await;
        let user = add_user(&f.ctx, "c@example.com").await;
        AddMember::new(f.project.clone(), user.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        let result = DeleteEpic::new(f.epic.clone())
            .with_actor(user)
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(TrackerError::Forbidden { .. })));
    }
}
