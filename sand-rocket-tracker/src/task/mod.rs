//! Task commands
//!
//! Tasks that change placement (add, move, delete) go through the
//! [`PositionLedger`](crate::ledger::PositionLedger) inside a write
//! transaction so every (epic, status) column stays numbered `0..n`.

mod add;
mod delete;
mod get;
mod list;
mod mv;
mod update;

pub use add::AddTask;
pub use delete::DeleteTask;
pub use get::GetTask;
pub use list::ListTasks;
pub use mv::MoveTask;
pub use update::UpdateTask;
