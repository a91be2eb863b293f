//! UpdateMember command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{ProjectId, Role, UserId};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Change a member's role
#[operation(verb = "update", noun = "member", description = "Change a project member's role")]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateMember {
    /// The project ID
    pub project_id: ProjectId,
    /// The member to change
    pub user_id: UserId,
    /// New role
    pub role: Role,
    /// Acting user; must be an owner
    pub actor: Option<UserId>,
}

impl UpdateMember {
    pub fn new(project_id: impl Into<ProjectId>, user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            project_id: project_id.into(),
            user_id: user_id.into(),
            role,
            actor: None,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for UpdateMember {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let member = ctx.write_transaction(|store| {
                store.require_project(&self.project_id)?;
                store.authorize(&self.project_id, self.actor.as_ref(), true)?;

                let mut member = store
                    .get_member(&self.project_id, &self.user_id)?
                    .ok_or_else(|| TrackerError::not_found("member", self.user_id.as_str()))?;

                if member.role == Role::Owner
                    && self.role != Role::Owner
                    && store.count_owners(&self.project_id)? <= 1
                {
                    return Err(TrackerError::forbidden(
                        "the last owner of a project cannot be demoted",
                    ));
                }

                store.update_member_role(&self.project_id, &self.user_id, self.role)?;
                member.role = self.role;
                Ok(member)
            })?;

            info!(
                project = %member.project_id,
                user = %member.user_id,
                role = %member.role,
                "member role changed"
            );
            Ok(serde_json::to_value(&member)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }

    fn affected_resource_ids(&self, _result: &Value) -> Vec<String> {
        vec![self.project_id.to_string(), self.user_id.to_string()]
    }
}
