//! DeleteInvitation command (revoke)

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{InvitationId, InvitationStatus, UserId};
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Revoke a pending invitation
#[operation(verb = "delete", noun = "invitation", description = "Revoke a pending invitation")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteInvitation {
    /// The invitation ID
    pub id: InvitationId,
    /// Acting user; must be an owner of the project
    pub actor: Option<UserId>,
}

impl DeleteInvitation {
    pub fn new(id: impl Into<InvitationId>) -> Self {
        Self {
            id: id.into(),
            actor: None,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for DeleteInvitation {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let invitation = ctx.write_transaction(|store| {
                let mut invitation = store.require_invitation(&self.id)?;
                store.authorize(&invitation.project_id, self.actor.as_ref(), true)?;
                if !invitation.is_pending() {
                    return Err(TrackerError::invalid_value(
                        "status",
                        format!("invitation {} is already {}", self.id, invitation.status),
                    ));
                }

                let now = Utc::now();
                store.set_invitation_status(&self.id, InvitationStatus::Revoked, now)?;
                invitation.status = InvitationStatus::Revoked;
                invitation.responded_at = Some(now);
                Ok(invitation)
            })?;

            info!(invitation = %invitation.id, "invitation revoked");
            Ok(serde_json::to_value(&invitation)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}
