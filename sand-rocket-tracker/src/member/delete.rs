//! DeleteMember command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{ProjectId, Role, UserId};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Remove a member from a project. Owners may remove anyone; any member may
/// remove themselves.
#[operation(verb = "delete", noun = "member", description = "Remove a user from a project")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteMember {
    /// The project ID
    pub project_id: ProjectId,
    /// The member to remove
    pub user_id: UserId,
    /// Acting user
    pub actor: Option<UserId>,
}

impl DeleteMember {
    pub fn new(project_id: impl Into<ProjectId>, user_id: impl Into<UserId>) -> Self {
        Self {
            project_id: project_id.into(),
            user_id: user_id.into(),
            actor: None,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for DeleteMember {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            ctx.write_transaction(|store| {
                store.require_project(&self.project_id)?;
                let leaving = self.actor.as_ref() == Some(&self.user_id);
                store.authorize(&self.project_id, self.actor.as_ref(), !leaving)?;

                let member = store
                    .get_member(&self.project_id, &self.user_id)?
                    .ok_or_else(|| TrackerError::not_found("member", self.user_id.as_str()))?;
                if member.role == Role::Owner && store.count_owners(&self.project_id)? <= 1 {
                    return Err(TrackerError::forbidden(
                        "the last owner of a project cannot be removed",
                    ));
                }
                store.delete_member(&self.project_id, &self.user_id)
            })?;

            info!(project = %self.project_id, user = %self.user_id, "member removed");
            Ok(json!({ "deleted": true, "project_id": self.project_id, "user_id": self.user_id }))
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }

    fn affected_resource_ids(&self, _result: &Value) -> Vec<String> {
        vec![self.project_id.to_string(), self.user_id.to_string()]
    }
}
