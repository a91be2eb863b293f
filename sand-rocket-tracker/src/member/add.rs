//! AddMember command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{Member, ProjectId, Role, UserId};
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Add an existing user to a project
#[operation(verb = "add", noun = "member", description = "Add a user to a project")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddMember {
    /// The project ID
    pub project_id: ProjectId,
    /// The user to add
    pub user_id: UserId,
    /// Role, contributor when omitted
    pub role: Option<Role>,
    /// Acting user; must be an owner
    pub actor: Option<UserId>,
}

impl AddMember {
    pub fn new(project_id: impl Into<ProjectId>, user_id: impl Into<UserId>) -> Self {
        Self {
            project_id: project_id.into(),
            user_id: user_id.into(),
            role: None,
            actor: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AddMember {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let member = ctx.write_transaction(|store| {
                store.require_project(&self.project_id)?;
                store.authorize(&self.project_id, self.actor.as_ref(), true)?;
                store.require_user(&self.user_id)?;

                if store.get_member(&self.project_id, &self.user_id)?.is_some() {
                    return Err(TrackerError::already_exists("member", self.user_id.as_str()));
                }
                let member = Member {
                    project_id: self.project_id.clone(),
                    user_id: self.user_id.clone(),
                    role: self.role.unwrap_or_default(),
                    joined_at: Utc::now(),
                };
                store.insert_member(&member)?;
                Ok(member)
            })?;

            info!(
                project = %member.project_id,
                user = %member.user_id,
                role = %member.role,
                "member added"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{add_user, fixture};

    #[tokio::test]
    async fn test_add_member_defaults_to_contributor() {
        let f = fixture().await;
        let user = add_user(&f.ctx, "c@example.com").await;

        let result = AddMember::new(f.project.clone(), user)
            .with_actor(f.owner.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["role"], "contributor");
    }

    #[tokio::test]
    async fn test_add_member_twice() {
        let f = fixture().await;
        let result = AddMember::new(f.project.clone(), f.owner.clone())
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(TrackerError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_non_member_cannot_add() {
        let f = fixture().await;
        let outsider = add_user(&f.ctx, "out@example.com").await;
        let user = add_user(&f.ctx, "c@example.com").await;

        let result = AddMember::new(f.project.clone(), user)
            .with_actor(outsider)
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(TrackerError::Forbidden { .. })));
    }
}
