//! ListMembers command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::ProjectId;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// List a project's members with their user records
#[operation(verb = "list", noun = "member", description = "List the members of a project")]
#[derive(Debug, Deserialize)]
pub struct ListMembers {
    /// The project ID
    #[param(alias = "id")]
    pub project_id: ProjectId,
}

impl ListMembers {
    pub fn new(project_id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListMembers {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            store.require_project(&self.project_id)?;
            let mut members = Vec::new();
            for member in store.list_members(&self.project_id)? {
                let mut value = serde_json::to_value(&member)?;
                if let Some(user) = store.get_user(&member.user_id)? {
                    value["email"] = json!(user.email);
                    value["display_name"] = json!(user.display_name);
                }
                members.push(value);
            }
            Ok(json!({ "count": members.len(), "members": members }))
        });
        ExecutionResult::unlogged(result)
    }
}
