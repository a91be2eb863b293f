//! AcceptInvitation command

use super::pending_for;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{InvitationId, InvitationStatus, Member, UserId};
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Accept an invitation, joining the project
#[operation(verb = "accept", noun = "invitation", description = "Accept an invitation and join its project")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AcceptInvitation {
    /// The invitation ID
    pub id: InvitationId,
    /// Accepting user; their email must match the invitation
    pub actor: UserId,
}

impl AcceptInvitation {
    pub fn new(id: impl Into<InvitationId>, actor: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            actor: actor.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AcceptInvitation {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let (invitation, member) = ctx.write_transaction(|store| {
                let mut invitation = pending_for(store, &self.id, Some(&self.actor))?;
                let now = Utc::now();

                let member = match store.get_member(&invitation.project_id, &self.actor)? {
                    Some(existing) => existing,
                    None => {
                        let member = Member {
                            project_id: invitation.project_id.clone(),
                            user_id: self.actor.clone(),
                            role: invitation.role,
                            joined_at: now,
                        };
                        store.insert_member(&member)?;
                        member
                    }
                };

                store.set_invitation_status(&self.id, InvitationStatus::Accepted, now)?;
                invitation.status = InvitationStatus::Accepted;
                invitation.responded_at = Some(now);
                Ok((invitation, member))
            })?;

            info!(
                invitation = %invitation.id,
                user = %self.actor,
                project = %invitation.project_id,
                "invitation accepted"
            );
            Ok(json!({ "invitation": invitation, "member": member, "id": invitation.id }))
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
    use crate::test_support::{add_user, fixture};
    use crate::types::Role;

    #[tokio::test]
    async fn test_accept_creates_membership() {
        let f = fixture().await;
        let invite = AddInvitation::new(f.project.clone(), "new@example.com")
            .with_role(Role::Owner)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        let user = add_user(&f.ctx, "new@example.com").await;

        let result = AcceptInvitation::new(invite["id"].as_str().unwrap(), user.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["invitation"]["status"], "accepted");
        assert_eq!(result["member"]["role"], "owner");

        let member = f.ctx.read(|store| store.get_member(&f.project, &user)).unwrap();
        assert_eq!(member.unwrap().role, Role::Owner);
    }

    #[tokio::test]
    async fn test_wrong_user_cannot_accept() {
        let f = fixture().await;
        let invite = AddInvitation::new(f.project.clone(), "new@example.com")
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        let impostor = add_user(&f.ctx, "impostor@example.com").await;

        let result = AcceptInvitation::new(invite["id"].as_str().unwrap(), impostor)
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(TrackerError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_accept_twice() {
        let f = fixture().await;
        let invite = AddInvitation::new(f.project.clone(), "new@example.com")
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        let id = invite["id"].as_str().unwrap();
        let user = add_user(&f.ctx, "new@example.com").await;

        AcceptInvitation::new(id, user.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        let result = AcceptInvitation::new(id, user).execute(&f.ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::InvalidValue { .. })));
    }
}
