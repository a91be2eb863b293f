//! GetProject command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::ProjectId;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::Value;

/// Get a project with its members and epics
#[operation(verb = "get", noun = "project", description = "Retrieve a project with its members and epics")]
#[derive(Debug, Deserialize)]
pub struct GetProject {
    /// The project ID
    pub id: ProjectId,
}

impl GetProject {
    pub fn new(id: impl Into<ProjectId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for GetProject {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            let project = store.require_project(&self.id)?;
            let mut value = serde_json::to_value(&project)?;
            value["members"] = serde_json::to_value(store.list_members(&self.id)?)?;
            value["epics"] = serde_json::to_value(store.list_epics(&self.id)?)?;
            Ok(value)
        });
        ExecutionResult::unlogged(result)
    }
}
