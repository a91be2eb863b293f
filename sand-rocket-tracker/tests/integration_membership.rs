//! Integration tests for project membership and invitations

use sand_rocket_tracker::{
    dispatch::execute_input, InvitationStatus, TrackerContext, TrackerError,
    TrackerOperationProcessor,
};
use serde_json::{json, Value};

async fn run(ctx: &TrackerContext, input: Value) -> sand_rocket_tracker::Result<Value> {
    execute_input(ctx, &TrackerOperationProcessor::new(), input).await
}

async fn user(ctx: &TrackerContext, email: &str) -> String {
    let user = run(ctx, json!({ "op": "add user", "email": email, "name": email }))
        .await
        .unwrap();
    user["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_invite_accept_then_work() {
    let ctx = TrackerContext::open_in_memory().unwrap();
    let owner = user(&ctx, "owner@example.com").await;
    let guest = user(&ctx, "guest@example.com").await;

    let project = run(&ctx, json!({ "op": "add project", "name": "Launch", "actor": owner }))
        .await
        .unwrap();
    let project_id = project["id"].as_str().unwrap();
    let epic = run(
        &ctx,
        json!({ "op": "add epic", "projectId": project_id, "title": "Engines", "actor": owner }),
    )
    .await
    .unwrap();
    let epic_id = epic["id"].as_str().unwrap();

    // Not a member yet
    let denied = run(
        &ctx,
        json!({ "op": "add task", "epicId": epic_id, "title": "Sneaky", "actor": guest }),
    )
    .await;
    assert!(matches!(denied, Err(TrackerError::Forbidden { .. })));

    // Only owners invite
    let not_owner = run(
        &ctx,
        json!({
            "op": "invite member",
            "projectId": project_id,
            "email": "x@example.com",
            "actor": guest,
        }),
    )
    .await;
    assert!(matches!(not_owner, Err(TrackerError::Forbidden { .. })));

    let invitation = run(
        &ctx,
        json!({
            "op": "invite member",
            "projectId": project_id,
            "email": "GUEST@example.com",
            "actor": owner,
        }),
    )
    .await
    .unwrap();
    let invitation_id = invitation["id"].as_str().unwrap();

    let duplicate = run(
        &ctx,
        json!({
            "op": "invite member",
            "projectId": project_id,
            "email": "guest@example.com",
            "actor": owner,
        }),
    )
    .await;
    assert!(matches!(duplicate, Err(TrackerError::AlreadyExists { .. })));

    // The invitation belongs to the invitee
    let wrong_user = run(
        &ctx,
        json!({ "op": "accept invitation", "id": invitation_id, "actor": owner }),
    )
    .await;
    assert!(matches!(wrong_user, Err(TrackerError::Forbidden { .. })));

    run(
        &ctx,
        json!({ "op": "accept invitation", "invitationId": invitation_id, "actor": guest }),
    )
    .await
    .unwrap();

    let task = run(
        &ctx,
        json!({ "op": "add task", "epicId": epic_id, "title": "Legit", "actor": guest }),
    )
    .await
    .unwrap();
    assert_eq!(task["position"], 0);

    let members = run(&ctx, json!({ "op": "list members", "projectId": project_id }))
        .await
        .unwrap();
    assert_eq!(members["count"], 2);

    let accepted = run(
        &ctx,
        json!({
            "op": "list invitations",
            "projectId": project_id,
            "status": InvitationStatus::Accepted,
        }),
    )
    .await
    .unwrap();
    assert_eq!(accepted["count"], 1);
}

#[tokio::test]
async fn test_last_owner_cannot_leave() {
    let ctx = TrackerContext::open_in_memory().unwrap();
    let owner = user(&ctx, "owner@example.com").await;
    let project = run(&ctx, json!({ "op": "add project", "name": "Solo", "actor": owner }))
        .await
        .unwrap();
    let project_id = project["id"].as_str().unwrap();

    let leave = run(
        &ctx,
        json!({ "op": "delete member", "projectId": project_id, "userId": owner, "actor": owner }),
    )
    .await;
    assert!(matches!(leave, Err(TrackerError::Forbidden { .. })));

    let demote = run(
        &ctx,
        json!({
            "op": "update member",
            "projectId": project_id,
            "userId": owner,
            "role": "contributor",
            "actor": owner,
        }),
    )
    .await;
    assert!(matches!(demote, Err(TrackerError::Forbidden { .. })));
}
