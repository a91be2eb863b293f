//! Core types for the tracker engine

mod activity;
mod attachment;
mod ids;
mod operation;
mod project;
mod task;

// Re-export all types
pub use activity::ActivityEntry;
pub use attachment::Attachment;
pub use ids::{AttachmentId, EpicId, InvitationId, ProjectId, TaskId, UserId};
pub use operation::{Noun, ParsedOperation, Verb};
pub use project::{Epic, Invitation, InvitationStatus, Member, Project, Role, User};
pub use task::{NewTask, Task, TaskPatch, TaskStatus};
