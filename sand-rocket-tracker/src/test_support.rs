//! Shared fixtures for command tests

use crate::epic::AddEpic;
use crate::project::AddProject;
use crate::task::AddTask;
use crate::types::{EpicId, ProjectId, TaskId, UserId};
use crate::user::AddUser;
use crate::{Execute, TrackerContext};

/// An owner, a project they own and one empty epic
pub(crate) struct Fixture {
    pub ctx: TrackerContext,
    pub owner: UserId,
    pub project: ProjectId,
    pub epic: EpicId,
}

pub(crate) async fn fixture() -> Fixture {
    let ctx = TrackerContext::open_in_memory().unwrap();
    let owner = add_user(&ctx, "owner@example.com").await;

    let project = AddProject::new("Launch", owner.clone())
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
    let project = ProjectId::from_string(project["id"].as_str().unwrap());

    let epic = AddEpic::new(project.clone(), "Engines")
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
    let epic = EpicId::from_string(epic["id"].as_str().unwrap());

    Fixture {
        ctx,
        owner,
        project,
        epic,
    }
}

pub(crate) async fn add_user(ctx: &TrackerContext, email: &str) -> UserId {
    let user = AddUser::new(email, email.split('@').next().unwrap())
        .execute(ctx)
        .await
        .into_result()
        .unwrap();
    UserId::from_string(user["id"].as_str().unwrap())
}

pub(crate) async fn add_task(ctx: &TrackerContext, epic: &EpicId, title: &str) -> TaskId {
    let task = AddTask::new(epic.clone(), title)
        .execute(ctx)
        .await
        .into_result()
        .unwrap();
    TaskId::from_string(task["id"].as_str().unwrap())
}
