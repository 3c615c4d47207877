//! Look up a player's numeric id from their username.

use crate::state::AppState;
use pmcp::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[schemars(deny_unknown_fields)]
pub struct ResolveIdInput {
    #[validate(length(min = 1, max = 64))]
    #[schemars(description = "The player's username (case-insensitive)")]
    pub username: String,
}

pub async fn execute(
    state: &Arc<AppState>,
    input: ResolveIdInput,
) -> Result<serde_json::Value, Error> {
    input
        .validate()
        .map_err(|e| Error::validation(format!("Validation failed: {}", e)))?;

    let identity = state.resolve_id(&input.username).await?;

    Ok(json!({
        "username": identity.handle,
        "id": identity.id
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::FakePlatform;
    use crate::state::fake_state;

    #[tokio::test]
    async fn test_returns_canonical_username() {
        let mut fake = FakePlatform::default();
        fake.users = vec![(42, "Builderman".to_string())];
        let (state, _) = fake_state(fake);

        let value = execute(
            &state,
            ResolveIdInput {
                username: "builderman".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(value["id"], 42);
        assert_eq!(value["username"], "Builderman");
    }

    #[tokio::test]
    async fn test_rejects_empty_username() {
        let (state, _) = fake_state(FakePlatform::default());
        let result = execute(
            &state,
            ResolveIdInput {
                username: String::new(),
            },
        )
        .await;
        assert!(result.is_err());
    }
}
