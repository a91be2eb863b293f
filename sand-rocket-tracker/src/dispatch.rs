//! Route parsed operations to their typed commands
//!
//! [`execute_parsed`] binds a [`ParsedOperation`]'s loose parameters onto the
//! command struct for its (verb, noun), fills in the acting user and runs it
//! through a [`TrackerOperationProcessor`] so the activity log sees it.

use crate::activity::ListActivity;
use crate::attachment::{AddAttachment, DeleteAttachment, GetAttachment, ListAttachments};
use crate::context::TrackerContext;
use crate::epic::{AddEpic, DeleteEpic, GetEpic, ListEpics, UpdateEpic};
use crate::error::{Result, TrackerError};
use crate::invitation::{
    AcceptInvitation, AddInvitation, DeclineInvitation, DeleteInvitation, ListInvitations,
};
use crate::member::{AddMember, DeleteMember, ListMembers, UpdateMember};
use crate::parse::parse_input;
use crate::processor::TrackerOperationProcessor;
use crate::project::{AddProject, DeleteProject, GetProject, ListProjects, UpdateProject};
use crate::task::{AddTask, DeleteTask, GetTask, ListTasks, MoveTask, UpdateTask};
use crate::types::{Noun, ParsedOperation, Verb};
use crate::user::{AddUser, GetUser, ListUsers};
use sand_rocket_operations::{Execute, Operation, OperationInfo, OperationProcessor};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

const ACTOR: &str = "actor";

/// Parse raw input and run every operation in it.
///
/// A single operation returns its own result; a batch returns an array and
/// stops at the first failure. Operations that already ran stay committed.
pub async fn execute_input(
    ctx: &TrackerContext,
    processor: &TrackerOperationProcessor,
    input: Value,
) -> Result<Value> {
    let batch = input.is_array();
    let mut results = Vec::new();
    for op in parse_input(input)? {
        results.push(execute_parsed(ctx, processor, op).await?);
    }

    if batch {
        return Ok(Value::Array(results));
    }
    results
        .pop()
        .ok_or_else(|| TrackerError::parse("no operation in input"))
}

/// Run one parsed operation
pub async fn execute_parsed(
    ctx: &TrackerContext,
    processor: &TrackerOperationProcessor,
    op: ParsedOperation,
) -> Result<Value> {
    use Noun::*;
    use Verb::*;

    let processor = match &op.actor {
        Some(actor) => processor.clone().with_actor(actor.as_str()),
        None => processor.clone(),
    };
    debug!(op = %op.op_string(), "dispatching");

    let run = Runner {
        ctx,
        processor: &processor,
        op: &op,
    };

    match (op.verb, op.noun) {
        (Add, User) => run.exec::<AddUser>().await,
        (Get, User) => run.exec::<GetUser>().await,
        (List, User) => run.exec::<ListUsers>().await,

        (Add, Project) => run.exec::<AddProject>().await,
        (Get, Project) => run.exec::<GetProject>().await,
        (List, Project) => run.exec::<ListProjects>().await,
        (Update, Project) => run.exec::<UpdateProject>().await,
        (Delete, Project) => run.exec::<DeleteProject>().await,

        (Add, Member) => run.exec::<AddMember>().await,
        (List, Member) => run.exec::<ListMembers>().await,
        (Update, Member) => run.exec::<UpdateMember>().await,
        (Delete, Member) => run.exec::<DeleteMember>().await,

        (Add, Invitation) => run.exec::<AddInvitation>().await,
        (List, Invitation) => run.exec::<ListInvitations>().await,
        (Accept, Invitation) => run.exec::<AcceptInvitation>().await,
        (Decline, Invitation) => run.exec::<DeclineInvitation>().await,
        (Delete, Invitation) => run.exec::<DeleteInvitation>().await,

        (Add, Epic) => run.exec::<AddEpic>().await,
        (Get, Epic) => run.exec::<GetEpic>().await,
        (List, Epic) => run.exec::<ListEpics>().await,
        (Update, Epic) => run.exec::<UpdateEpic>().await,
        (Delete, Epic) => run.exec::<DeleteEpic>().await,

        (Add, Task) => run.exec::<AddTask>().await,
        (Get, Task) => run.exec::<GetTask>().await,
        (List, Task) => run.exec::<ListTasks>().await,
        (Update, Task) => run.exec::<UpdateTask>().await,
        (Move, Task) => run.exec::<MoveTask>().await,
        (Delete, Task) => run.exec::<DeleteTask>().await,

        (Add, Attachment) => run.exec::<AddAttachment>().await,
        (Get, Attachment) => run.exec::<GetAttachment>().await,
        (List, Attachment) => run.exec::<ListAttachments>().await,
        (Delete, Attachment) => run.exec::<DeleteAttachment>().await,

        (List, Activity) => run.exec::<ListActivity>().await,

        (verb, noun) => Err(TrackerError::InvalidOperation {
            verb: verb.to_string(),
            noun: noun.to_string(),
        }),
    }
}

/// Metadata for every operation [`execute_parsed`] can run
pub fn catalog() -> Vec<OperationInfo> {
    vec![
        AddUser::info(),
        GetUser::info(),
        ListUsers::info(),
        AddProject::info(),
        GetProject::info(),
        ListProjects::info(),
        UpdateProject::info(),
        DeleteProject::info(),
        AddMember::info(),
        ListMembers::info(),
        UpdateMember::info(),
        DeleteMember::info(),
        AddInvitation::info(),
        ListInvitations::info(),
        AcceptInvitation::info(),
        DeclineInvitation::info(),
        DeleteInvitation::info(),
        AddEpic::info(),
        GetEpic::info(),
        ListEpics::info(),
        UpdateEpic::info(),
        DeleteEpic::info(),
        AddTask::info(),
        GetTask::info(),
        ListTasks::info(),
        UpdateTask::info(),
        MoveTask::info(),
        DeleteTask::info(),
        AddAttachment::info(),
        GetAttachment::info(),
        ListAttachments::info(),
        DeleteAttachment::info(),
        ListActivity::info(),
    ]
}

struct Runner<'a> {
    ctx: &'a TrackerContext,
    processor: &'a TrackerOperationProcessor,
    op: &'a ParsedOperation,
}

impl Runner<'_> {
    async fn exec<T>(&self) -> Result<Value>
    where
        T: Execute<TrackerContext, TrackerError> + DeserializeOwned + Send + Sync,
    {
        let info = T::info();
        let params = bind_params(&info, &self.op.params, self.processor.actor())?;
        let command: T = serde_json::from_value(Value::Object(params))
            .map_err(|e| TrackerError::parse(format!("{}: {}", info.op_string(), e)))?;
        self.processor.process(&command, self.ctx).await
    }
}

/// Resolve declared aliases, inject the actor and check required parameters
fn bind_params(
    info: &OperationInfo,
    raw: &Map<String, Value>,
    actor: Option<&str>,
) -> Result<Map<String, Value>> {
    let declared = |name: &str| info.parameters.iter().any(|p| p.name == name);
    let mut params = raw.clone();

    for param in info.parameters {
        for alias in param.aliases.iter().filter(|a| !declared(a)) {
            if let Some(value) = params.remove(*alias) {
                params.entry(param.name.to_string()).or_insert(value);
            }
        }
    }

    if declared(ACTOR) && !params.contains_key(ACTOR) {
        if let Some(actor) = actor {
            params.insert(ACTOR.to_string(), Value::String(actor.to_string()));
        }
    }

    if let Some(missing) = info
        .parameters
        .iter()
        .filter(|p| p.required)
        .find(|p| params.get(p.name).is_none_or(Value::is_null))
    {
        return Err(TrackerError::missing_field(missing.name));
    }

    Ok(params)
}
