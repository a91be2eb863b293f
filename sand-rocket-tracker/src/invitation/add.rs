//! AddInvitation command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{Invitation, InvitationId, InvitationStatus, ProjectId, Role, UserId};
use crate::user::normalize_email;
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Invite someone to a project by email
#[operation(verb = "add", noun = "invitation", description = "Invite an email address to join a project")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddInvitation {
    /// The project ID
    pub project_id: ProjectId,
    /// Invitee's email address
    pub email: String,
    /// Role granted on acceptance, contributor when omitted
    pub role: Option<Role>,
    /// Inviting user; must be an owner
    pub actor: Option<UserId>,
}

impl AddInvitation {
    pub fn new(project_id: impl Into<ProjectId>, email: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            email: email.into(),
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
impl Execute<TrackerContext, TrackerError> for AddInvitation {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let email = normalize_email(&self.email)?;

            let invitation = ctx.write_transaction(|store| {
                store.require_project(&self.project_id)?;
                store.authorize(&self.project_id, self.actor.as_ref(), true)?;

                if let Some(user) = store.find_user_by_email(&email)? {
                    if store.get_member(&self.project_id, &user.id)?.is_some() {
                        return Err(TrackerError::already_exists("member", email.as_str()));
                    }
                }
                if store.find_pending_invitation(&self.project_id, &email)?.is_some() {
                    return Err(TrackerError::already_exists("invitation", email.as_str()));
                }

                let invitation = Invitation {
                    id: InvitationId::new(),
                    project_id: self.project_id.clone(),
                    email: email.clone(),
                    role: self.role.unwrap_or_default(),
                    invited_by: self.actor.clone(),
                    status: InvitationStatus::Pending,
                    created_at: Utc::now(),
                    responded_at: None,
                };
                store.insert_invitation(&invitation)?;
                Ok(invitation)
            })?;

            info!(invitation = %invitation.id, project = %invitation.project_id, "invitation sent");
            Ok(serde_json::to_value(&invitation)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}
