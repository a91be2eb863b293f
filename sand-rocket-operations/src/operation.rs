//! The `Operation` metadata trait and the `Execute` trait

use crate::{params_schema, ExecutionResult, ParamMeta};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Static description of an operation type, available without an instance
#[derive(Debug, Clone, Copy)]
pub struct OperationInfo {
    pub verb: &'static str,
    pub noun: &'static str,
    pub description: &'static str,
    pub parameters: &'static [ParamMeta],
}

impl OperationInfo {
    /// Canonical "verb noun" string
    pub fn op_string(&self) -> String {
        format!("{} {}", self.verb, self.noun)
    }

    /// JSON description including a parameter schema
    pub fn to_json(&self) -> Value {
        json!({
            "op": self.op_string(),
            "description": self.description,
            "parameters": params_schema(self.parameters),
        })
    }
}

/// Static metadata describing an operation.
///
/// Implemented by the `#[operation]` attribute macro; not written by hand.
pub trait Operation {
    /// Verb, e.g. "move"
    fn verb(&self) -> &'static str;

    /// Noun, e.g. "task"
    fn noun(&self) -> &'static str;

    /// One-line description for help output
    fn description(&self) -> &'static str;

    /// Parameters derived from the struct fields
    fn parameters(&self) -> &'static [ParamMeta];

    /// Canonical "verb noun" string used in logs and dispatch
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }

    /// Metadata for the type, without needing an instance
    fn info() -> OperationInfo
    where
        Self: Sized;
}

/// Run an operation against a context `C`, failing with `E`.
#[async_trait]
pub trait Execute<C, E>: Operation
where
    C: Send + Sync,
    E: Send,
{
    /// Execute the operation
    async fn execute(&self, ctx: &C) -> ExecutionResult<Value, E>;

    /// Ids of the resources touched by this execution, recorded alongside
    /// the log entry
    fn affected_resource_ids(&self, result: &Value) -> Vec<String> {
        result
            .get("id")
            .and_then(|v| v.as_str())
            .map(|id| vec![id.to_string()])
            .unwrap_or_default()
    }
}
