//! Position ledger: dense ordering of tasks within each (epic, status) column
//!
//! Every column holds positions `0..n`. Creates append at `n`, moves
//! recompute the touched columns from scratch, deletes close the gap.
//!
//! The ledger never opens transactions itself. Callers run it on a
//! repository bound to [`crate::TrackerContext::write_transaction`] so the
//! load, recompute and persist steps happen under one write lock.

use crate::error::{Result, TrackerError};
use crate::repository::TaskRepository;
use crate::types::{EpicId, NewTask, Task, TaskId, TaskPatch, TaskStatus, UserId};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Where a task should end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTarget {
    pub status: TaskStatus,
    /// Index in the destination column; `None` appends. Values past the end
    /// are clamped to the end.
    pub position: Option<u32>,
    /// Destination epic; `None` keeps the current one
    pub epic_id: Option<EpicId>,
}

impl MoveTarget {
    pub fn new(status: TaskStatus) -> Self {
        Self {
            status,
            position: None,
            epic_id: None,
        }
    }

    pub fn at(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn in_epic(mut self, epic_id: impl Into<EpicId>) -> Self {
        self.epic_id = Some(epic_id.into());
        self
    }
}

/// One row whose placement has to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionChange {
    pub id: TaskId,
    pub epic_id: EpicId,
    pub status: TaskStatus,
    pub position: u32,
}

/// Outcome of a successful reorder
#[derive(Debug, Clone)]
pub struct Reordered {
    /// The moved task as persisted
    pub task: Task,
    /// Siblings whose position was rewritten
    pub rewritten: Vec<TaskId>,
}

/// Column order: position, then creation time, then id
fn column_order(a: &Task, b: &Task) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.as_str().cmp(b.id.as_str()))
}

fn clamp_index(requested: Option<u32>, len: usize) -> usize {
    requested.map_or(len, |p| (p as usize).min(len))
}

/// Compute the placement writes for moving `moving` to `to`.
///
/// `source` is the moving task's current column and may include the task
/// itself. `target` is the destination column when it differs from the
/// source; it is ignored for same-column moves and treated as empty when
/// absent. The moved task is always part of the result; other rows appear
/// only when their position changes.
pub fn plan_reorder(
    source: &[Task],
    target: Option<&[Task]>,
    moving: &Task,
    to: &MoveTarget,
) -> Vec<PositionChange> {
    let target_epic = to.epic_id.clone().unwrap_or_else(|| moving.epic_id.clone());
    let same_column = moving.same_partition(&target_epic, to.status);

    let mut remaining: Vec<&Task> = source.iter().filter(|t| t.id != moving.id).collect();
    remaining.sort_by(|a, b| column_order(a, b));

    let mut changes = Vec::new();

    if same_column {
        let index = clamp_index(to.position, remaining.len());
        remaining.insert(index, moving);
        for (position, task) in remaining.iter().enumerate() {
            let position = position as u32;
            if task.id == moving.id || task.position != position {
                changes.push(PositionChange {
                    id: task.id.clone(),
                    epic_id: task.epic_id.clone(),
                    status: task.status,
                    position,
                });
            }
        }
        return changes;
    }

    // Close the gap left behind
    for (position, task) in remaining.iter().enumerate() {
        let position = position as u32;
        if task.position != position {
            changes.push(PositionChange {
                id: task.id.clone(),
                epic_id: task.epic_id.clone(),
                status: task.status,
                position,
            });
        }
    }

    let mut destination: Vec<&Task> = target
        .unwrap_or_default()
        .iter()
        .filter(|t| t.id != moving.id)
        .collect();
    destination.sort_by(|a, b| column_order(a, b));
    let index = clamp_index(to.position, destination.len());
    destination.insert(index, moving);

    for (position, task) in destination.iter().enumerate() {
        let position = position as u32;
        if task.id == moving.id {
            changes.push(PositionChange {
                id: task.id.clone(),
                epic_id: target_epic.clone(),
                status: to.status,
                position,
            });
        } else if task.position != position {
            changes.push(PositionChange {
                id: task.id.clone(),
                epic_id: task.epic_id.clone(),
                status: task.status,
                position,
            });
        }
    }

    changes
}

/// Ordering operations over a task repository
pub struct PositionLedger<'r, R: TaskRepository + ?Sized> {
    repo: &'r R,
}

impl<'r, R: TaskRepository + ?Sized> PositionLedger<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Position a new task in this column receives
    pub fn next_append_position(&self, epic_id: &EpicId, status: TaskStatus) -> Result<u32> {
        Ok(self
            .repo
            .max_position(epic_id, status)?
            .map_or(0, |max| max + 1))
    }

    /// Insert a task at the end of its column
    pub fn append(&self, input: &NewTask) -> Result<Task> {
        let position = self.next_append_position(&input.epic_id, input.status)?;
        let task = self.repo.create(input, position)?;
        debug!(
            task = %task.id,
            epic = %task.epic_id,
            status = %task.status,
            position,
            "appended task"
        );
        Ok(task)
    }

    /// Move a task and renumber the columns it leaves and enters.
    ///
    /// `Ok(None)` when the task does not exist; nothing is written then.
    /// A failed write part way through returns [`TrackerError::ReorderFailed`];
    /// the caller's transaction must be rolled back.
    pub fn reorder(
        &self,
        id: &TaskId,
        to: &MoveTarget,
        edited_by: Option<&UserId>,
    ) -> Result<Option<Reordered>> {
        let Some(moving) = self.repo.get(id)? else {
            debug!(task = %id, "reorder skipped, task not found");
            return Ok(None);
        };

        let target_epic = to.epic_id.clone().unwrap_or_else(|| moving.epic_id.clone());
        let source = self.repo.list_partition(&moving.epic_id, moving.status)?;
        let target = if moving.same_partition(&target_epic, to.status) {
            None
        } else {
            Some(self.repo.list_partition(&target_epic, to.status)?)
        };

        let changes = plan_reorder(&source, target.as_deref(), &moving, to);
        debug!(task = %id, writes = changes.len(), "planned reorder");

        let mut moved = None;
        let mut rewritten = Vec::new();
        for change in changes {
            let is_moving = &change.id == id;
            let patch = TaskPatch::new(change.id.clone())
                .with_placement(change.epic_id, change.status, change.position)
                .with_edited_by(if is_moving { edited_by.cloned() } else { None });

            let updated = self
                .repo
                .update(&patch)
                .map_err(|e| TrackerError::reorder_failed(id.as_str(), e))?
                .ok_or_else(|| {
                    TrackerError::reorder_failed(
                        id.as_str(),
                        format!("task {} disappeared mid-reorder", change.id),
                    )
                })?;

            if is_moving {
                moved = Some(updated);
            } else {
                rewritten.push(change.id);
            }
        }

        let task = moved.ok_or_else(|| {
            TrackerError::reorder_failed(id.as_str(), "moved task was not written")
        })?;
        info!(
            task = %task.id,
            epic = %task.epic_id,
            status = %task.status,
            position = task.position,
            siblings = rewritten.len(),
            "task reordered"
        );
        Ok(Some(Reordered { task, rewritten }))
    }

    /// Renumber a column to `0..n` after a removal; returns the ids rewritten
    pub fn compact(&self, epic_id: &EpicId, status: TaskStatus) -> Result<Vec<TaskId>> {
        let mut column = self.repo.list_partition(epic_id, status)?;
        column.sort_by(column_order);

        let mut rewritten = Vec::new();
        for (position, task) in column.into_iter().enumerate() {
            let position = position as u32;
            if task.position == position {
                continue;
            }
            let patch = TaskPatch {
                position: Some(position),
                ..TaskPatch::new(task.id.clone())
            };
            self.repo
                .update(&patch)?
                .ok_or_else(|| TrackerError::TaskNotFound {
                    id: task.id.to_string(),
                })?;
            rewritten.push(task.id);
        }

        if !rewritten.is_empty() {
            debug!(epic = %epic_id, %status, rewritten = rewritten.len(), "compacted column");
        }
        Ok(rewritten)
    }
}
