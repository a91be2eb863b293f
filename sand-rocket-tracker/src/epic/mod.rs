//! Epic commands

mod add;
mod delete;
mod get;
mod list;
mod update;

pub use add::AddEpic;
pub use delete::DeleteEpic;
pub use get::GetEpic;
pub use list::ListEpics;
pub use update::UpdateEpic;
