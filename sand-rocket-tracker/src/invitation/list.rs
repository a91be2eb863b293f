//! ListInvitations command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{InvitationStatus, ProjectId};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// List a project's invitations
#[operation(verb = "list", noun = "invitation", description = "List a project's invitations, optionally by status")]
#[derive(Debug, Deserialize)]
pub struct ListInvitations {
    /// The project ID
    pub project_id: ProjectId,
    /// Only invitations in this state
    pub status: Option<InvitationStatus>,
}

impl ListInvitations {
    pub fn new(project_id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: project_id.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: InvitationStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListInvitations {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            store.require_project(&self.project_id)?;
            let invitations = store.list_invitations(&self.project_id, self.status)?;
            Ok(json!({ "count": invitations.len(), "invitations": invitations }))
        });
        ExecutionResult::unlogged(result)
    }
}
