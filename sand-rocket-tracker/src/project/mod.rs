//! Project commands

mod add;
mod delete;
mod get;
mod list;
mod update;

pub use add::AddProject;
pub use delete::DeleteProject;
pub use get::GetProject;
pub use list::ListProjects;
pub use update::UpdateProject;
