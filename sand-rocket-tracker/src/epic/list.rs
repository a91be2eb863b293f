//! ListEpics command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::ProjectId;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// List the epics of a project
#[operation(verb = "list", noun = "epic", description = "List the epics of a project")]
#[derive(Debug, Deserialize)]
pub struct ListEpics {
    /// The project ID
    pub project_id: ProjectId,
}

impl ListEpics {
    pub fn new(project_id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListEpics {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            store.require_project(&self.project_id)?;
            let epics = store.list_epics(&self.project_id)?;
            Ok(json!({ "count": epics.len(), "epics": epics }))
        });
        ExecutionResult::unlogged(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epic::AddEpic;
    use crate::test_support::fixture;

    #[tokio::test]
    async fn test_list_epics_in_creation_order() {
        let f = fixture().await;
        AddEpic::new(f.project.clone(), "Avionics")
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        let result = ListEpics::new(f.project.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["count"], 2);
        assert_eq!(result["epics"][0]["name"], "Engines");
        assert_eq!(result["epics"][1]["name"], "Avionics");
    }
}
