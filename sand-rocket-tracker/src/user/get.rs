//! GetUser command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::types::UserId;
use sand_rocket_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::Deserialize;
use serde_json::Value;

/// Look up a user by id or email
#[operation(verb = "get", noun = "user", description = "Retrieve a user by id or email")]
#[derive(Debug, Default, Deserialize)]
pub struct GetUser {
    /// The user ID
    pub id: Option<UserId>,
    /// Email address, used when no id is given
    pub email: Option<String>,
}

impl GetUser {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: Some(id.into()),
            email: None,
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: Some(email.into()),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for GetUser {
    async fn execute(&self, ctx: &TrackerContext) -> ExecutionResult<Value, TrackerError> {
        let result: Result<Value> = ctx.read(|store| {
            let user = match (&self.id, &self.email) {
                (Some(id), _) => store.require_user(id)?,
                (None, Some(email)) => store
                    .find_user_by_email(email)?
                    .ok_or_else(|| TrackerError::UserNotFound { id: email.clone() })?,
                (None, None) => return Err(TrackerError::missing_field("id")),
            };
            Ok(serde_json::to_value(&user)?)
        });
        ExecutionResult::unlogged(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::AddUser;

    #[tokio::test]
    async fn test_get_by_id_and_email() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let added = AddUser::new("ada@example.com", "Ada")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        let id = added["id"].as_str().unwrap();

        let by_id = GetUser::new(id).execute(&ctx).await.into_result().unwrap();
        assert_eq!(by_id["email"], "ada@example.com");

        let by_email = GetUser::by_email("ADA@example.com")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(by_email["id"], id);
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let ctx = TrackerContext::open_in_memory().unwrap();
        let result = GetUser::new("nope").execute(&ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::UserNotFound { .. })));

        let result = GetUser::default().execute(&ctx).await.into_result();
        assert!(matches!(result, Err(TrackerError::MissingField { .. })));
    }
}
