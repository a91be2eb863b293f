//! UpdateEpic command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{EpicId, UserId};
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rename or re-describe an epic
#[operation(verb = "update", noun = "epic", description = "Update an epic's name or description")]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateEpic {
    /// The epic ID
    pub id: EpicId,
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// Acting user; must be a project member
    pub actor: Option<UserId>,
}

impl UpdateEpic {
    pub fn new(id: impl Into<EpicId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            actor: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<UserId>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for UpdateEpic {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let epic = ctx.write_transaction(|store| {
                let mut epic = store.require_epic(&self.id)?;
                store.authorize(&epic.project_id, self.actor.as_ref(), false)?;

                if let Some(name) = &self.name {
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TrackerError::invalid_value("name", "must not be empty"));
                    }
                    epic.name = name.to_string();
                }
                if let Some(description) = &self.description {
                    epic.description = description.clone();
                }
                epic.updated_at = Utc::now();
                store.update_epic(&epic)?;
                Ok(epic)
            })?;
            Ok(serde_json::to_value(&epic)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;

    #[tokio::test]
    async fn test_update_epic() {
        let f = fixture().await;
        let result = UpdateEpic::new(f.epic.clone())
            .with_name("Propulsion")
            .with_actor(f.owner.clone())
            .execute(&f.ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["name"], "Propulsion");
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let f = fixture().await;
        let result = UpdateEpic::new(f.epic.clone())
            .with_name("")
            .execute(&f.ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(TrackerError::InvalidValue { .. })));
    }
}
