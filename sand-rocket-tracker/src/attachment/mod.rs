//! Attachment commands
//!
//! Attachments record document metadata against a task. The bytes stay
//! wherever `path` points.

mod add;
mod delete;
mod get;
mod list;

pub use add::AddAttachment;
pub use delete::DeleteAttachment;
pub use get::GetAttachment;
pub use list::ListAttachments;
