//! DeclineInvitation command

use super::pending_for;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{InvitationId, InvitationStatus, UserId};
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Decline an invitation
#[operation(verb = "decline", noun = "invitation", description = "Decline an invitation")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeclineInvitation {
    /// The invitation ID
    pub id: InvitationId,
    /// Declining user; their email must match the invitation
    pub actor: Option<UserId>,
}

impl DeclineInvitation {
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
impl Execute<TrackerContext, TrackerError> for DeclineInvitation {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let invitation = ctx.write_transaction(|store| {
                let mut invitation = pending_for(store, &self.id, self.actor.as_ref())?;
                let now = Utc::now();
                store.set_invitation_status(&self.id, InvitationStatus::Declined, now)?;
                invitation.status = InvitationStatus::Declined;
                invitation.responded_at = Some(now);
                Ok(invitation)
            })?;

            info!(invitation = %invitation.id, "invitation declined");
            Ok(serde_json::to_value(&invitation)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invitation::AddInvitation;
    use crate::test_support::fixture;

    #[tokio::test]
    async fn test_decline() {
        let f = fixture().await;
        let invite = AddInvitation::new(f.project.clone(), "new@example.com")
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        let result = DeclineInvitation::new(invite["id"].as_str().unwrap())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["status"], "declined");
        assert!(result["responded_at"].is_string());
    }

    #[tokio::test]
    async fn test_decline_missing() {
        let f = fixture().await;
        let result = DeclineInvitation::new("nope").execute(&f.ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::InvitationNotFound { .. })));
    }
}
