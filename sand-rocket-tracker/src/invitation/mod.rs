//! Invitation commands
//!
//! An invitation is addressed to an email, not a user, so people can be
//! invited before they register. Only pending invitations can be answered;
//! deleting one marks it revoked and keeps the record.

mod accept;
mod add;
mod decline;
mod delete;
mod list;

pub use accept::AcceptInvitation;
pub use add::AddInvitation;
pub use decline::DeclineInvitation;
pub use delete::DeleteInvitation;
pub use list::ListInvitations;

use crate::error::{Result, TrackerError};
use crate::store::Store;
use crate::types::{Invitation, InvitationId, UserId};

/// Load a pending invitation addressed to `actor`'s email.
///
/// No actor skips the recipient check.
fn pending_for(store: &Store<'_>, id: &InvitationId, actor: Option<&UserId>) -> Result<Invitation> {
    let invitation = store.require_invitation(id)?;
    if !invitation.is_pending() {
        return Err(TrackerError::invalid_value(
            "status",
            format!("invitation {} is already {}", id, invitation.status),
        ));
    }

    if let Some(actor) = actor {
        let user = store.require_user(actor)?;
        if !user.email.eq_ignore_ascii_case(&invitation.email) {
            return Err(TrackerError::forbidden(format!(
                "invitation {} is not addressed to user {}",
                id, actor
            )));
        }
    }
    Ok(invitation)
}
