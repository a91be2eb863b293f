//! ListProjects command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::UserId;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// List projects, optionally only those a user belongs to
#[operation(verb = "list", noun = "project", description = "List projects, optionally for one member")]
#[derive(Debug, Default, Deserialize)]
pub struct ListProjects {
    /// Only projects this user is a member of
    pub user_id: Option<UserId>,
}

impl ListProjects {
    pub fn for_user(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListProjects {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            let projects = match &self.user_id {
                Some(user_id) => store.list_projects_for_user(user_id)?,
                None => store.list_projects()?,
            };
            Ok(json!({ "count": projects.len(), "projects": projects }))
        });
        ExecutionResult::unlogged(result)
    }
}
