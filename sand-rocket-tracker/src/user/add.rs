//! AddUser command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::{User, UserId};
use chrono::Utc;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Register a user
#[operation(verb = "add", noun = "user", description = "Register a user by email")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddUser {
    /// Email address, unique ignoring case
    pub email: String,
    /// Name shown to other members
    #[param(alias = "name")]
    pub display_name: String,
}

impl AddUser {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
        }
    }
}

/// Trimmed email, or an error when it cannot be an address
pub(crate) fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email.to_string()),
        _ => Err(TrackerError::invalid_value(
            "email",
            format!("'{}' is not an email address", email),
        )),
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AddUser {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);

        let result: Result<Value> = async {
            let email = normalize_email(&self.email)?;
            let display_name = self.display_name.trim();
            if display_name.is_empty() {
                return Err(TrackerError::invalid_value("display_name", "must not be empty"));
            }

            let user = ctx.write_transaction(|store| {
                if store.find_user_by_email(&email)?.is_some() {
                    return Err(TrackerError::already_exists("user", email.as_str()));
                }
                let user = User {
                    id: UserId::new(),
                    email: email.clone(),
                    display_name: display_name.to_string(),
                    created_at: Utc::now(),
                };
                store.insert_user(&user)?;
                Ok(user)
            })?;

            info!(user = %user.id, "user registered");
            Ok(serde_json::to_value(&user)?)
        }
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        ExecutionResult::logged(self.op_string(), input, result, duration_ms)
    }
}
