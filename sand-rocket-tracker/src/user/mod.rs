//! User commands

mod add;
mod get;
mod list;

pub use add::AddUser;
pub(crate) use add::normalize_email;
pub use get::GetUser;
pub use list::ListUsers;
