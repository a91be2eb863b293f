//! UpdateProject command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{ProjectId, UserId};
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rename or re-describe a project
#[operation(verb = "update", noun = "project", description = "Update a project's name or description")]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateProject {
    /// The project ID
    pub id: ProjectId,
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// Acting user; must be an owner
    pub actor: Option<UserId>,
}

impl UpdateProject {
    pub fn new(id: impl Into<ProjectId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            actor: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for UpdateProject {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let project = ctx.write_transaction(|store| {
                let mut project = store.require_project(&self.id)?;
                store.authorize(&self.id, self.actor.as_ref(), true)?;

                if let Some(name) = &self.name {
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TrackerError::invalid_value("name", "must not be empty"));
                    }
                    project.name = name.to_string();
                }
                if let Some(description) = &self.description {
                    project.description = description.clone();
                }
                project.updated_at = Utc::now();
                store.update_project(&project)?;
                Ok(project)
            })?;
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
    use crate::member::AddMember;
    use crate::test_support::{add_user, fixture};

    #[tokio::test]
    async fn test_owner_can_rename() {
        let f = fixture().await;
        let result = UpdateProject::new(f.project.clone())
            .with_name("Orbit")
            .with_actor(f.owner.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["name"], "Orbit");
        assert_eq!(result["description"], "");
    }

    #[tokio::test]
    async fn test_contributor_cannot_rename() {
        let f = fixture().await;
        let contributor = add_user(&f.ctx, "c@example.com").await;
        AddMember::new(f.project.clone(), contributor.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        let result = UpdateProject::new(f.project.clone())
            .with_name("Mine now")
            .with_actor(contributor)
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(TrackerError::Forbidden { .. })));
    }
}
