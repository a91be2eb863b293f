//! AddAttachment command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{Attachment, AttachmentId, TaskId, UserId};
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Attach a document to an existing task
#[operation(verb = "add", noun = "attachment", description = "Attach a document to a task")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddAttachment {
    /// The task ID to attach to
    pub task_id: TaskId,
    /// Display name of the document
    pub name: String,
    /// Where the document lives
    pub path: String,
    /// MIME type, detected from the extension when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size in bytes, read from disk when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Uploading user; must be a project member
    pub actor: Option<UserId>,
}

impl AddAttachment {
    pub fn new(
        task_id: impl Into<TaskId>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            name: name.into(),
            path: path.into(),
            mime_type: None,
            size: None,
            actor: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

/// MIME type from the file extension
fn detect_mime_type(path: &str) -> Option<&'static str> {
    let ext = std::path::Path::new(path)
        .extension()?
        .to_str()?
        .to_lowercase();

    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",

        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",

        "txt" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "yaml" | "yml" => "application/yaml",

        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",

        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        _ => return None,
    };
    Some(mime)
}

/// Size of a local file, `None` when it cannot be read
fn file_size(path: &str) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AddAttachment {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            if self.name.trim().is_empty() {
                return Err(TrackerError::invalid_value("name", "must not be empty"));
            }
            if self.path.trim().is_empty() {
                return Err(TrackerError::invalid_value("path", "must not be empty"));
            }

            let attachment = Attachment {
                id: AttachmentId::new(),
                task_id: self.task_id.clone(),
                name: self.name.trim().to_string(),
                path: self.path.clone(),
                mime_type: self
                    .mime_type
                    .clone()
                    .or_else(|| detect_mime_type(&self.path).map(String::from))
                    .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
                size: self.size.or_else(|| file_size(&self.path)).unwrap_or(0),
                uploaded_by: self.actor.clone(),
                created_at: Utc::now(),
            };

            ctx.write_transaction(|store| {
                let task = store.require_task(&self.task_id)?;
                let epic = store.require_epic(&task.epic_id)?;
                store.authorize(&epic.project_id, self.actor.as_ref(), false)?;
                store.insert_attachment(&attachment)
            })?;

            Ok(serde_json::to_value(&attachment)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }

    fn affected_resource_ids(&self, result: &Value) -> Vec<String> {
        let mut ids = vec![self.task_id.to_string()];
        ids.extend(result.get("id").and_then(Value::as_str).map(String::from));
        ids
    }
}
