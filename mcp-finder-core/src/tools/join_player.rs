//! Find the server a player is in and join it.

use crate::actions::Target;
use crate::state::AppState;
use pmcp::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[schemars(deny_unknown_fields)]
pub struct JoinPlayerInput {
    /// Target username; ignored when `id` is given
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    #[schemars(description = "Target username. Used when no id is given.")]
    pub username: Option<String>,

    #[serde(default)]
    #[validate(range(min = 1))]
    #[schemars(description = "Target user id. Takes precedence over username.")]
    pub id: Option<u64>,

    #[serde(default)]
    #[validate(range(min = 1))]
    #[schemars(
        description = "Place (game) id whose servers to search. Defaults to the configured place."
    )]
    pub place_id: Option<u64>,
}

pub async fn execute(
    state: &Arc<AppState>,
    input: JoinPlayerInput,
) -> Result<serde_json::Value, Error> {
    input
        .validate()
        .map_err(|e| Error::validation(format!("Validation failed: {}", e)))?;

    let outcome = state
        .join_player(Target::new(input.username, input.id), input.place_id)
        .await?;

    serde_json::to_value(outcome)
        .map_err(|e| Error::internal(format!("Failed to encode result: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::{avatar, filler_page, session, FakePlatform};
    use crate::state::fake_state;

    #[tokio::test]
    async fn test_join_by_id() {
        let mut page0 = filler_page(0, 10);
        page0.sessions[9] = session("here", &["fp-42"]);
        let mut fake = FakePlatform::with_pages(vec![page0]);
        fake.users = vec![(42, "Target".to_string())];
        fake.avatars.insert(42, avatar("fp-42"));
        let (state, launcher) = fake_state(fake);

        let value = execute(
            &state,
            JoinPlayerInput {
                username: None,
                id: Some(42),
                place_id: Some(99),
            },
        )
        .await
        .unwrap();

        assert_eq!(value["status"], "joined");
        assert_eq!(value["place_id"], 99);
        assert_eq!(value["session"]["guid"], "here");
        assert_eq!(launcher.submitted.lock().unwrap()[0].0, 99);
    }

    #[tokio::test]
    async fn test_not_found_is_a_result() {
        let mut fake = FakePlatform::with_pages(vec![filler_page(0, 3)]);
        fake.users = vec![(42, "Target".to_string())];
        fake.avatars.insert(42, avatar("fp-42"));
        let (state, _) = fake_state(fake);

        let value = execute(
            &state,
            JoinPlayerInput {
                username: Some("Target".to_string()),
                id: None,
                place_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(value["status"], "not_found");
        assert_eq!(value["pages_checked"], 1);
    }

    #[tokio::test]
    async fn test_rejects_zero_place() {
        let (state, _) = fake_state(FakePlatform::default());
        let result = execute(
            &state,
            JoinPlayerInput {
                username: Some("x".to_string()),
                id: None,
                place_id: Some(0),
            },
        )
        .await;
        assert!(result.is_err());
    }
}
