//! Processor that runs tracker operations and records them in the activity log

use crate::context::TrackerContext;
use crate::error::TrackerError;
use sand_rocket_operations::{async_trait, Execute, LogEntry, OperationProcessor};
use serde_json::Value;
use tracing::{debug, warn};

/// Executes operations against a [`TrackerContext`] and writes their log
/// entries to the `activity` table, attributed to the configured actor or,
/// failing that, to the actor the operation itself carries.
#[derive(Debug, Clone, Default)]
pub struct TrackerOperationProcessor {
    actor: Option<String>,
}

impl TrackerOperationProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute log entries to this user id
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }
}

#[async_trait]
impl OperationProcessor<TrackerContext, TrackerError> for TrackerOperationProcessor {
    async fn process<T>(&self, operation: &T, ctx: &TrackerContext) -> Result<Value, TrackerError>
    where
        T: Execute<TrackerContext, TrackerError> + Send + Sync,
    {
        let (result, log_entry) = operation.execute(ctx).await.split();

        if let Some(mut entry) = log_entry {
            if entry.actor.is_none() {
                entry.actor = self.actor.clone().or_else(|| input_actor(&entry.input));
            }
            let affected = match &result {
                Ok(value) => operation.affected_resource_ids(value),
                Err(_) => Vec::new(),
            };

            // A failed operation's own error wins over a failure to log it
            match (&result, self.write_log(ctx, &entry, &affected).await) {
                (_, Ok(())) => debug!(op = %entry.op, "recorded activity"),
                (Err(_), Err(log_error)) => {
                    warn!(op = %entry.op, %log_error, "could not record failed operation")
                }
                (Ok(_), Err(log_error)) => return Err(log_error),
            }
        }

        result
    }

    async fn write_log(
        &self,
        ctx: &TrackerContext,
        log_entry: &LogEntry,
        affected_resources: &[String],
    ) -> Result<(), TrackerError> {
        ctx.append_activity(log_entry, affected_resources)
    }
}

/// The `actor` an operation carried in its own input, if any
fn input_actor(input: &Value) -> Option<String> {
    input.get("actor").and_then(Value::as_str).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::AddProject;
    use crate::test_support::add_user;
    use crate::user::{AddUser, ListUsers};

    #[tokio::test]
    async fn test_mutations_are_logged_with_actor() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let processor = TrackerOperationProcessor::new().with_actor("u-admin");

        processor
            .process(&AddUser::new("ada@example.com", "Ada"), &ctx)
            .await
            .unwrap();

        let entries = ctx.read_activity(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].op, "add user");
        assert_eq!(entries[0].actor.as_deref(), Some("u-admin"));
        assert_eq!(entries[0].affected.len(), 1);
    }

    #[tokio::test]
    async fn test_operation_actor_logged_without_processor_actor() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let owner = add_user(&ctx, "owner@example.com").await;
        let processor = TrackerOperationProcessor::new();

        processor
            .process(&AddProject::new("Launch", owner.clone()), &ctx)
            .await
            .unwrap();

        let entries = ctx.read_activity(None).unwrap();
        assert_eq!(entries[0].op, "add project");
        assert_eq!(entries[0].actor.as_deref(), Some(owner.as_str()));
    }

    #[tokio::test]
    async fn test_processor_actor_wins_over_operation_actor() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let owner = add_user(&ctx, "owner@example.com").await;
        let processor = TrackerOperationProcessor::new().with_actor("u-admin");

        processor
            .process(&AddProject::new("Launch", owner), &ctx)
            .await
            .unwrap();

        let entries = ctx.read_activity(None).unwrap();
        assert_eq!(entries[0].actor.as_deref(), Some("u-admin"));
    }

    #[tokio::test]
    async fn test_reads_are_not_logged() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let processor = TrackerOperationProcessor::new();

        processor.process(&ListUsers::default(), &ctx).await.unwrap();
        assert!(ctx.read_activity(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_logged_and_returned() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let processor = TrackerOperationProcessor::new();

        processor
            .process(&AddUser::new("ada@example.com", "Ada"), &ctx)
            .await
            .unwrap();
        let duplicate = processor
            .process(&AddUser::new("ADA@example.com", "Ada again"), &ctx)
            .await;
        assert!(matches!(duplicate, Err(TrackerError::AlreadyExists { .. })));

        let entries = ctx.read_activity(None).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].output.get("error").is_some());
    }
}
