//! AddProject command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{Member, Project, ProjectId, Role, UserId};
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Create a project; the creating user becomes its owner
#[operation(verb = "add", noun = "project", description = "Create a project owned by the actor")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddProject {
    /// Project name
    pub name: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// User creating the project
    #[param(alias = "owner")]
    pub actor: UserId,
}

impl AddProject {
    pub fn new(name: impl Into<String>, actor: impl Into<UserId>) -> Self {
        Self {
            name: name.into(),
            description: None,
            actor: actor.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AddProject {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let name = self.name.trim();
            if name.is_empty() {
                return Err(TrackerError::invalid_value("name", "must not be empty"));
            }

            let project = ctx.write_transaction(|store| {
                store.require_user(&self.actor)?;

                let now = Utc::now();
                let project = Project {
                    id: ProjectId::new(),
                    name: name.to_string(),
                    description: self.description.clone().unwrap_or_default(),
                    created_at: now,
                    updated_at: now,
                };
                store.insert_project(&project)?;
                store.insert_member(&Member {
                    project_id: project.id.clone(),
                    user_id: self.actor.clone(),
                    role: Role::Owner,
                    joined_at: now,
                })?;
                Ok(project)
            })?;

            info!(project = %project.id, owner = %self.actor, "project created");
            Ok(serde_json::to_value(&project)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::add_user;

    #[tokio::test]
    async fn test_creator_becomes_owner() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let user = add_user(&ctx, "ada@example.com").await;

        let result = AddProject::new("Launch", user.clone())
            .with_description("Get to orbit")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["name"], "Launch");
        assert_eq!(result["description"], "Get to orbit");

        let project_id = ProjectId::from_string(result["id"].as_str().unwrap());
        let member = ctx
            .read(|store| store.get_member(&project_id, &user))
            .unwrap()
            .unwrap();
        assert_eq!(member.role, Role::Owner);
    }

    #[tokio::test]
    async fn test_unknown_owner_rejected() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let result = AddProject::new("Launch", "ghost").execute(&ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::UserNotFound { .. })));
        assert!(ctx.read(|store| store.list_projects()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let user = add_user(&ctx, "ada@example.com").await;
        let result = AddProject::new("  ", user).execute(&ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::InvalidValue { .. })));
    }
}
