//! # Sand Rocket Operations
//!
//! Operations are plain structs whose fields are the parameters. The
//! `#[operation]` attribute derives the [`Operation`] metadata (verb, noun,
//! description, parameter list) from the struct itself, and the struct
//! implements [`Execute`] against whatever context it needs.
//!
//! ## Example
//!
//! ```ignore
//! use sand_rocket_operations::*;
//!
//! #[operation(verb = "move", noun = "task", description = "Move a task")]
//! #[derive(Debug, Deserialize, Serialize)]
//! pub struct MoveTask {
//!     /// The task to move
//!     pub id: TaskId,
//!     /// Target position within the status column
//!     pub position: Option<u32>,
//! }
//!
//! #[async_trait]
//! impl Execute<TrackerContext, TrackerError> for MoveTask {
//!     async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
//!         // mutate, then return ExecutionResult::Logged { .. }
//!     }
//! }
//! ```
//!
//! An [`OperationProcessor`] sits between the caller and `execute`, deciding
//! what happens to the [`LogEntry`] each execution produces.

mod execution_result;
mod log;
mod operation;
mod parameter;
mod processor;

pub use execution_result::ExecutionResult;
pub use log::LogEntry;
pub use operation::{Execute, Operation, OperationInfo};
pub use parameter::{params_schema, ParamMeta, ParamType};
pub use processor::OperationProcessor;

// Re-export proc macros
pub use sand_rocket_operations_macros::operation;

// Re-export for use in implementations
pub use async_trait::async_trait;
pub use serde_json::Value;
