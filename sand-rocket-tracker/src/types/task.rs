//! Task types: Task, TaskStatus, NewTask, TaskPatch

use super::ids::{EpicId, TaskId, UserId};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow status; each status is one column of an epic
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Backlog,
    InProgress,
    Done,
}

impl TaskStatus {
    /// All statuses in board order
    pub const ALL: [TaskStatus; 3] = [Self::Backlog, Self::InProgress, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "backlog" | "todo" => Ok(Self::Backlog),
            "in_progress" | "inprogress" | "doing" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown task status '{}'", other)),
        }
    }
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// A task/card inside an epic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub epic_id: EpicId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    /// Zero-based index within the (epic, status) column
    pub position: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_edited_by_user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// True when both tasks share an (epic, status) column
    pub fn same_partition(&self, epic_id: &EpicId, status: TaskStatus) -> bool {
        &self.epic_id == epic_id && self.status == status
    }
}

/// Input for inserting a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub epic_id: EpicId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub creator_user_id: Option<UserId>,
}

/// Partial update; `None` fields are left alone. `updated_at` always refreshes.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub id: TaskId,
    pub epic_id: Option<EpicId>,
    pub status: Option<TaskStatus>,
    pub position: Option<u32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub edited_by: Option<UserId>,
}

impl TaskPatch {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_placement(mut self, epic_id: EpicId, status: TaskStatus, position: u32) -> Self {
        self.epic_id = Some(epic_id);
        self.status = Some(status);
        self.position = Some(position);
        self
    }

    pub fn with_edited_by(mut self, user: Option<UserId>) -> Self {
        self.edited_by = user;
        self
    }
}
