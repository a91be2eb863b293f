//! AddEpic command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{Epic, EpicId, ProjectId, UserId};
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Add an epic to a project
#[operation(verb = "add", noun = "epic", description = "Create an epic inside a project")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddEpic {
    /// The project ID
    pub project_id: ProjectId,
    /// Epic name
    #[param(alias = "title")]
    pub name: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Acting user; must be a project member
    pub actor: Option<UserId>,
}

impl AddEpic {
    pub fn new(project_id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            name: name.into(),
            description: None,
            actor: None,
        }
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
impl Execute<TrackerContext, TrackerError> for AddEpic {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let name = self.name.trim();
            if name.is_empty() {
                return Err(TrackerError::invalid_value("name", "must not be empty"));
            }

            let epic = ctx.write_transaction(|store| {
                store.require_project(&self.project_id)?;
                store.authorize(&self.project_id, self.actor.as_ref(), false)?;

                let now = Utc::now();
                let epic = Epic {
                    id: EpicId::new(),
                    project_id: self.project_id.clone(),
                    name: name.to_string(),
                    description: self.description.clone().unwrap_or_default(),
                    created_at: now,
                    updated_at: now,
                };
                store.insert_epic(&epic)?;
                Ok(epic)
            })?;

            info!(epic = %epic.id, project = %epic.project_id, "epic created");
            Ok(serde_json::to_value(&epic)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{add_user, fixture};

    #[tokio::test]
    async fn test_add_epic() {
        let f = fixture().await;
        let result = AddEpic::new(f.project.clone(), "Avionics")
            .with_description("Flight computers")
            .with_actor(f.owner.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["name"], "Avionics");
        assert_eq!(result["project_id"], f.project.as_str());
    }

    #[tokio::test]
    async fn test_add_epic_to_missing_project() {
        let f = fixture().await;
        let result = AddEpic::new("missing", "Nowhere").execute(&f.ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::ProjectNotFound { .. })));
    }

    #[tokio::test]
    async fn test_outsider_cannot_add_epic() {
        let f = fixture().await;
        let outsider = add_user(&f.ctx, "out@example.com").await;
        let result = AddEpic::new(f.project.clone(), "Sneaky")
            .with_actor(outsider)
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(TrackerError::Forbidden { .. })));
    }
}
