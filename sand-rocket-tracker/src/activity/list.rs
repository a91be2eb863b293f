//! ListActivity command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// Read the activity log, newest first
#[operation(verb = "list", noun = "activity", description = "List recorded operations, newest first")]
#[derive(Debug, Default, Deserialize)]
pub struct ListActivity {
    /// Maximum number of entries
    pub limit: Option<usize>,
}

impl ListActivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListActivity {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read_activity(self.limit).map(|entries| {
            json!({
                "count": entries.len(),
                "entries": entries,
            })
        });
        ExecutionResult::unlogged(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::MoveTask;
    use crate::test_support::{add_task, fixture};
    use crate::types::TaskStatus;
    use crate::{OperationProcessor, TrackerOperationProcessor};

    #[tokio::test]
    async fn test_list_activity_newest_first() {
        let f = fixture().await;
        let task = add_task(&f.ctx, &f.epic, "A").await;
        let processor = TrackerOperationProcessor::new().with_actor(f.owner.as_str());

        processor
            .process(&MoveTask::new(task.clone(), TaskStatus::Done), &f.ctx)
            .await
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        processor
            .process(&MoveTask::new(task, TaskStatus::InProgress), &f.ctx)
            .await
            .unwrap();

        let result = ListActivity::new()
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["count"], 2);
        assert_eq!(result["entries"][0]["input"]["status"], "in_progress");
        assert_eq!(result["entries"][0]["actor"], f.owner.as_str());

        let limited = ListActivity::new()
            .with_limit(1)
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(limited["count"], 1);
    }
}
