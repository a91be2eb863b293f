//! ListUsers command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// List all users
#[operation(verb = "list", noun = "user", description = "List all registered users")]
#[derive(Debug, Default, Deserialize)]
pub struct ListUsers {}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListUsers {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            let users = store.list_users()?;
            Ok(json!({ "count": users.len(), "users": users }))
        });
        ExecutionResult::unlogged(result)
    }
}
