//! Execution result types for operations

use crate::LogEntry;

/// Outcome of executing an operation
///
/// - `Logged`: the operation changed state and belongs in the activity log
/// - `Unlogged`: read-only, nothing to record
/// - `Failed`: an error, optionally with a log entry describing the attempt
pub enum ExecutionResult<T, E> {
    /// Operation succeeded and should be logged
    Logged { value: T, log_entry: LogEntry },
    /// Operation succeeded, no logging needed
    Unlogged { value: T },
    /// Operation failed
    Failed {
        error: E,
        log_entry: Option<LogEntry>,
    },
}

impl<T, E> ExecutionResult<T, E> {
    /// Build a result from a mutating operation's outcome.
    ///
    /// Success becomes `Logged` with the value as output; failure becomes
    /// `Failed` carrying a log entry whose output is `{"error": "..."}`.
    pub fn logged(
        op: impl Into<String>,
        input: serde_json::Value,
        result: Result<T, E>,
        duration_ms: u64,
    ) -> Self
    where
        T: Clone + Into<serde_json::Value>,
        E: std::fmt::Display,
    {
        let op = op.into();
        match result {
            Ok(value) => Self::Logged {
                log_entry: LogEntry::new(op, input, value.clone().into(), None, duration_ms),
                value,
            },
            Err(error) => {
                let output = serde_json::json!({ "error": error.to_string() });
                Self::Failed {
                    log_entry: Some(LogEntry::new(op, input, output, None, duration_ms)),
                    error,
                }
            }
        }
    }

    /// Build a result from a read-only operation's outcome
    pub fn unlogged(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Unlogged { value },
            Err(error) => Self::Failed {
                error,
                log_entry: None,
            },
        }
    }

    /// Extract the result (Ok or Err)
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Logged { value, .. } => Ok(value),
            Self::Unlogged { value } => Ok(value),
            Self::Failed { error, .. } => Err(error),
        }
    }

    /// Get the value and log entry separately
    pub fn split(self) -> (Result<T, E>, Option<LogEntry>) {
        match self {
            Self::Logged { value, log_entry } => (Ok(value), Some(log_entry)),
            Self::Unlogged { value } => (Ok(value), None),
            Self::Failed { error, log_entry } => (Err(error), log_entry),
        }
    }

    /// Check if this should be logged
    pub fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Logged { .. }
                | Self::Failed {
                    log_entry: Some(_),
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_logged_success_carries_output() {
        let result: ExecutionResult<Value, String> =
            ExecutionResult::logged("move task", json!({"id": "t1"}), Ok(json!({"id": "t1"})), 3);

        assert!(result.should_log());
        let (value, entry) = result.split();
        assert_eq!(value.unwrap()["id"], "t1");
        let entry = entry.unwrap();
        assert_eq!(entry.op, "move task");
        assert_eq!(entry.output["id"], "t1");
        assert_eq!(entry.duration_ms, 3);
    }

    #[test]
    fn test_logged_failure_records_error() {
        let result: ExecutionResult<Value, String> =
            ExecutionResult::logged("move task", json!({}), Err("task not found: x".into()), 0);

        assert!(result.should_log());
        let (value, entry) = result.split();
        assert_eq!(value.unwrap_err(), "task not found: x");
        assert_eq!(entry.unwrap().output["error"], "task not found: x");
    }

    #[test]
    fn test_unlogged_is_not_logged() {
        let ok: ExecutionResult<Value, String> = ExecutionResult::unlogged(Ok(json!([])));
        assert!(!ok.should_log());

        let err: ExecutionResult<Value, String> = ExecutionResult::unlogged(Err("boom".into()));
        assert!(!err.should_log());
        assert!(err.into_result().is_err());
    }
}
