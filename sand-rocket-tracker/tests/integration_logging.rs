//! Integration tests for activity logging

use sand_rocket_tracker::{
    dispatch::execute_input, epic::AddEpic, project::AddProject, task::{AddTask, GetTask, MoveTask},
    user::AddUser, Execute, OperationProcessor, TaskStatus, TrackerContext,
    TrackerOperationProcessor,
};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_activity_logging_end_to_end() {
    let temp = TempDir::new().unwrap();
    let ctx = TrackerContext::open(temp.path().join("tracker.db")).unwrap();

    let user = AddUser::new("ada@example.com", "Ada")
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
    let user_id = user["id"].as_str().unwrap().to_string();
    let processor = TrackerOperationProcessor::new().with_actor(user_id.as_str());

    let project = processor
        .process(&AddProject::new("Launch", user_id.as_str()), &ctx)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    let epic = processor
        .process(&AddEpic::new(project["id"].as_str().unwrap(), "Engines"), &ctx)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    let task = processor
        .process(&AddTask::new(epic["id"].as_str().unwrap(), "Fuel pump"), &ctx)
        .await
        .unwrap();
    let task_id = task["id"].as_str().unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;

    processor
        .process(&MoveTask::new(task_id, TaskStatus::InProgress), &ctx)
        .await
        .unwrap();

    // Reads are not logged
    processor.process(&GetTask::new(task_id), &ctx).await.unwrap();

    let entries = ctx.read_activity(None).unwrap();
    let ops: Vec<&str> = entries.iter().map(|e| e.op.as_str()).collect();
    assert_eq!(ops, ["move task", "add task", "add epic", "add project"]);
    assert!(entries
        .iter()
        .all(|e| e.actor.as_deref() == Some(user_id.as_str())));
    assert_eq!(entries[0].affected, vec![task_id.to_string()]);
}

#[tokio::test]
async fn test_failed_operations_are_logged() {
    let ctx = TrackerContext::open_in_memory().unwrap();
    let processor = TrackerOperationProcessor::new();

    let result = execute_input(
        &ctx,
        &processor,
        json!({ "op": "move task", "id": "missing", "status": "done", "actor": "someone" }),
    )
    .await;
    assert!(result.is_err());

    let entries = ctx.read_activity(None).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].op, "move task");
    assert_eq!(entries[0].actor.as_deref(), Some("someone"));
    assert!(entries[0].output.get("error").is_some());
}

#[tokio::test]
async fn test_list_activity_through_dispatch() {
    let ctx = TrackerContext::open_in_memory().unwrap();
    let processor = TrackerOperationProcessor::new();

    execute_input(
        &ctx,
        &processor,
        json!([
            { "op": "add user", "email": "a@example.com", "name": "A" },
            { "op": "add user", "email": "b@example.com", "name": "B" }
        ]),
    )
    .await
    .unwrap();

    let listed = execute_input(&ctx, &processor, json!({ "list": "activity", "limit": 1 }))
        .await
        .unwrap();
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["entries"][0]["op"], "add user");
}
