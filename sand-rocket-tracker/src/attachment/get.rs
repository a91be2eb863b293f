//! GetAttachment command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::AttachmentId;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::Value;

/// Get one attachment's metadata
#[operation(verb = "get", noun = "attachment", description = "Retrieve an attachment by ID")]
#[derive(Debug, Deserialize)]
pub struct GetAttachment {
    /// The attachment ID
    pub id: AttachmentId,
}

impl GetAttachment {
    pub fn new(id: impl Into<AttachmentId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for GetAttachment {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            let attachment = store
                .get_attachment(&self.id)?
                .ok_or_else(|| TrackerError::not_found("attachment", self.id.as_str()))?;
            Ok(serde_json::to_value(&attachment)?)
        });
        ExecutionResult::unlogged(result)
    }
}
