//! Project membership commands
//!
//! Changing membership is owner-only. A project always keeps at least one
//! owner: the last one can be neither removed nor demoted.

mod add;
mod delete;
mod list;
mod update;

pub use add::AddMember;
pub use delete::DeleteMember;
pub use list::ListMembers;
pub use update::UpdateMember;
