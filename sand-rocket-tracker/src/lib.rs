//! Sand Rocket tracker engine
//!
//! Projects contain epics, epics contain tasks, and every task sits at a
//! position inside its (epic, status) column. All state lives in one SQLite
//! database.
//!
//! ## Overview
//!
//! - **Operations** - every action is a struct implementing [`Execute`]
//!   against a [`TrackerContext`], e.g. [`task::MoveTask`]
//! - **Position ledger** - [`ledger::PositionLedger`] keeps each column's
//!   positions dense and zero-based across creates, moves and deletes
//! - **Serialized writes** - anything that rewrites positions runs inside
//!   [`TrackerContext::write_transaction`], an `IMMEDIATE` SQLite transaction
//!   taken under the connection lock
//! - **Activity log** - [`TrackerOperationProcessor`] records each mutating
//!   operation with its actor
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use sand_rocket_tracker::{
//!     epic::AddEpic, project::AddProject, task::{AddTask, MoveTask}, user::AddUser,
//!     Execute, TaskStatus, TrackerContext,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = TrackerContext::open("sand-rocket.db")?;
//!
//! let user = AddUser::new("ada@example.com", "Ada").execute(&ctx).await.into_result()?;
//! let user_id = user["id"].as_str().unwrap_or_default();
//! let project = AddProject::new("Launch", user_id).execute(&ctx).await.into_result()?;
//! let epic = AddEpic::new(project["id"].as_str().unwrap_or_default(), "Engines")
//!     .execute(&ctx)
//!     .await
//!     .into_result()?;
//!
//! let task = AddTask::new(epic["id"].as_str().unwrap_or_default(), "Fuel pump")
//!     .execute(&ctx)
//!     .await
//!     .into_result()?;
//!
//! MoveTask::new(task["id"].as_str().unwrap_or_default(), TaskStatus::InProgress)
//!     .with_position(0)
//!     .execute(&ctx)
//!     .await
//!     .into_result()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod context;
pub mod dispatch;
mod error;
pub mod ledger;
pub mod parse;
mod processor;
pub mod repository;
mod schema;
mod store;
pub mod types;

#[cfg(test)]
mod test_support;

// Command modules
pub mod activity;
pub mod attachment;
pub mod epic;
pub mod invitation;
pub mod member;
pub mod project;
pub mod task;
pub mod user;

// Re-export Execute trait and types from operations crate
pub use sand_rocket_operations::{
    async_trait, Execute, ExecutionResult, Operation, OperationInfo, OperationProcessor,
};

pub use config::{ConfigError, DatabaseConfig, TaskSettings, TrackerConfig};
pub use context::TrackerContext;
pub use error::{Result, TrackerError};
pub use processor::TrackerOperationProcessor;
pub use store::Store;

// Re-export commonly used types
pub use types::{
    ActivityEntry, Attachment, AttachmentId, Epic, EpicId, Invitation, InvitationId,
    InvitationStatus, Member, Project, ProjectId, Role, Task, TaskId, TaskStatus, User, UserId,
};
