//! Where was a player last seen.

use crate::actions::Target;
use crate::state::AppState;
use pmcp::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[schemars(deny_unknown_fields)]
pub struct LookupPresenceInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    #[schemars(description = "Target username. Used when no id is given.")]
    pub username: Option<String>,

    #[serde(default)]
    #[validate(range(min = 1))]
    #[schemars(description = "Target user id. Takes precedence over username.")]
    pub id: Option<u64>,
}

pub async fn execute(
    state: &Arc<AppState>,
    input: LookupPresenceInput,
) -> Result<serde_json::Value, Error> {
    input
        .validate()
        .map_err(|e| Error::validation(format!("Validation failed: {}", e)))?;

    let lookup = state
        .lookup_presence(Target::new(input.username, input.id))
        .await?;

    serde_json::to_value(lookup)
        .map_err(|e| Error::internal(format!("Failed to encode result: {}", e)))
}
