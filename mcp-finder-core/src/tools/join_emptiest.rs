//! Join a server near the tail of the listing.

use crate::state::AppState;
use pmcp::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[schemars(deny_unknown_fields)]
pub struct JoinEmptiestInput {
    #[serde(default)]
    #[validate(range(min = 1))]
    #[schemars(description = "Place (game) id. Defaults to the configured place.")]
    pub place_id: Option<u64>,
}

pub async fn execute(
    state: &Arc<AppState>,
    input: JoinEmptiestInput,
) -> Result<serde_json::Value, Error> {
    input
        .validate()
        .map_err(|e| Error::validation(format!("Validation failed: {}", e)))?;

    let outcome = state.join_emptiest(input.place_id).await?;

    serde_json::to_value(outcome)
        .map_err(|e| Error::internal(format!("Failed to encode result: {}", e)))
}
