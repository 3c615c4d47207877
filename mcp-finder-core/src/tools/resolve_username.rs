//! Look up a player's username from their numeric id.

use crate::state::AppState;
use pmcp::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[schemars(deny_unknown_fields)]
pub struct ResolveUsernameInput {
    #[validate(range(min = 1))]
    #[schemars(description = "The player's numeric user id")]
    pub id: u64,
}

pub async fn execute(
    state: &Arc<AppState>,
    input: ResolveUsernameInput,
) -> Result<serde_json::Value, Error> {
    input
        .validate()
        .map_err(|e| Error::validation(format!("Validation failed: {}", e)))?;

    let identity = state.resolve_username(input.id).await?;

    Ok(json!({
        "username": identity.handle,
        "id": identity.id
    }))
}
