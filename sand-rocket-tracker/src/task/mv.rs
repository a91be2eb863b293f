//! MoveTask command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::ledger::{MoveTarget, PositionLedger};
use crate::types::{EpicId, TaskId, TaskStatus, UserId};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Move a task to another status, position or epic
#[operation(verb = "move", noun = "task", description = "Move a task to a different status, position or epic")]
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveTask {
    /// The task ID to move
    pub id: TaskId,
    /// Destination status column
    #[param(alias = "column")]
    pub status: TaskStatus,
    /// Index in the destination column; appends when omitted, clamps past the end
    #[param(alias = "index")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Destination epic in the same project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<EpicId>,
    /// Editing user; must be a project member
    #[param(alias = "edited_by")]
    pub actor: Option<UserId>,
}

impl MoveTask {
    /// Move to the end of a status column
    pub fn new(id: impl Into<TaskId>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            status,
            position: None,
            epic_id: None,
            actor: None,
        }
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn to_epic(mut self, epic_id: impl Into<EpicId>) -> Self {
        self.epic_id = Some(epic_id.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    fn target(&self) -> MoveTarget {
        MoveTarget {
            status: self.status,
            position: self.position,
            epic_id: self.epic_id.clone(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for MoveTask {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let reordered = ctx.write_transaction(|store| {
                let task = store.require_task(&self.id)?;
                let epic = store.require_epic(&task.epic_id)?;
                store.authorize(&epic.project_id, self.actor.as_ref(), false)?;

                if let Some(target) = self.epic_id.as_ref().filter(|e| **e != task.epic_id) {
                    if !ctx.settings().allow_epic_reassignment {
                        return Err(TrackerError::invalid_value(
                            "epic_id",
                            "moving tasks between epics is disabled",
                        ));
                    }
                    let target_epic = store.require_epic(target)?;
                    if target_epic.project_id != epic.project_id {
                        return Err(TrackerError::invalid_value(
                            "epic_id",
                            format!("epic {} belongs to another project", target),
                        ));
                    }
                }

                PositionLedger::new(&store.tasks())
                    .reorder(&self.id, &self.target(), self.actor.as_ref())?
                    .ok_or_else(|| TrackerError::TaskNotFound {
                        id: self.id.to_string(),
                    })
            })?;

            Ok(serde_json::to_value(&reordered.task)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskSettings;
    use crate::epic::AddEpic;
    use crate::project::AddProject;
    use crate::repository::TaskRepository;
    use crate::task::AddTask;
    use crate::test_support::{add_task, fixture, Fixture};
    use crate::types::ProjectId;

    fn column(f: &Fixture, epic: &EpicId, status: TaskStatus) -> Vec<(String, u32)> {
        f.ctx
            .read(|store| store.tasks().list_partition(epic, status))
            .unwrap()
            .into_iter()
            .map(|t| (t.title, t.position))
            .collect()
    }

    async fn new_epic(f: &Fixture, project: &ProjectId, name: &str) -> EpicId {
        let epic = AddEpic::new(project.clone(), name)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        EpicId::from_string(epic["id"].as_str().unwrap())
    }

    #[tokio::test]
    async fn test_move_to_front_of_column() {
        let f = fixture().await;
        add_task(&f.ctx, &f.epic, "A").await;
        add_task(&f.ctx, &f.epic, "B").await;
        let c = add_task(&f.ctx, &f.epic, "C").await;

        let result = MoveTask::new(c, TaskStatus::Backlog)
            .with_position(0)
            .with_actor(f.owner.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["position"], 0);
        assert_eq!(result["last_edited_by_user_id"], f.owner.as_str());
        assert_eq!(
            column(&f, &f.epic, TaskStatus::Backlog),
            vec![("C".into(), 0), ("A".into(), 1), ("B".into(), 2)]
        );
    }

    #[tokio::test]
    async fn test_move_between_columns() {
        let f = fixture().await;
        let a = add_task(&f.ctx, &f.epic, "A").await;
        add_task(&f.ctx, &f.epic, "B").await;
        AddTask::new(f.epic.clone(), "X")
            .with_status(TaskStatus::InProgress)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        let result = MoveTask::new(a, TaskStatus::InProgress)
            .with_position(1)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["status"], "in_progress");
        assert_eq!(column(&f, &f.epic, TaskStatus::Backlog), vec![("B".into(), 0)]);
        assert_eq!(
            column(&f, &f.epic, TaskStatus::InProgress),
            vec![("X".into(), 0), ("A".into(), 1)]
        );
    }

    #[tokio::test]
    async fn test_move_without_position_appends() {
        let f = fixture().await;
        let a = add_task(&f.ctx, &f.epic, "A").await;
        add_task(&f.ctx, &f.epic, "B").await;

        let result = MoveTask::new(a, TaskStatus::Backlog)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["position"], 1);
        assert_eq!(
            column(&f, &f.epic, TaskStatus::Backlog),
            vec![("B".into(), 0), ("A".into(), 1)]
        );
    }

    #[tokio::test]
    async fn test_move_missing_task() {
        let f = fixture().await;
        add_task(&f.ctx, &f.epic, "A").await;

        let result = MoveTask::new("missing", TaskStatus::Done)
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(TrackerError::TaskNotFound { .. })));
        assert_eq!(column(&f, &f.epic, TaskStatus::Backlog), vec![("A".into(), 0)]);
    }

    #[tokio::test]
    async fn test_move_to_other_epic() {
        let f = fixture().await;
        let a = add_task(&f.ctx, &f.epic, "A").await;
        add_task(&f.ctx, &f.epic, "B").await;
        let avionics = new_epic(&f, &f.project, "Avionics").await;
        add_task(&f.ctx, &avionics, "Y").await;

        let result = MoveTask::new(a, TaskStatus::Backlog)
            .to_epic(avionics.clone())
            .with_position(0)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["epic_id"], avionics.as_str());
        assert_eq!(column(&f, &f.epic, TaskStatus::Backlog), vec![("B".into(), 0)]);
        assert_eq!(
            column(&f, &avionics, TaskStatus::Backlog),
            vec![("A".into(), 0), ("Y".into(), 1)]
        );
    }

    #[tokio::test]
    async fn test_move_to_other_epic_disabled() {
        let mut f = fixture().await;
        f.ctx = f.ctx.with_settings(TaskSettings {
            allow_epic_reassignment: false,
        });
        let a = add_task(&f.ctx, &f.epic, "A").await;
        let avionics = new_epic(&f, &f.project, "Avionics").await;

        let result = MoveTask::new(a.clone(), TaskStatus::Backlog)
            .to_epic(avionics)
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(TrackerError::InvalidValue { .. })));
        assert_eq!(column(&f, &f.epic, TaskStatus::Backlog), vec![("A".into(), 0)]);

        // Naming the current epic is not a reassignment
        MoveTask::new(a, TaskStatus::Done)
            .to_epic(f.epic.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
    }

    #[tokio::test]
    async fn test_move_to_epic_in_other_project() {
        let f = fixture().await;
        let a = add_task(&f.ctx, &f.epic, "A").await;
        let other = AddProject::new("Other", f.owner.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        let other = ProjectId::from_string(other["id"].as_str().unwrap());
        let foreign = new_epic(&f, &other, "Foreign").await;

        let result = MoveTask::new(a, TaskStatus::Backlog)
            .to_epic(foreign)
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(TrackerError::InvalidValue { .. })));
    }
}
