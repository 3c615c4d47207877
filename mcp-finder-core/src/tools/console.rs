//! The scrollback pane: read it, clear it.

use crate::state::{Action, AppState};
use pmcp::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[schemars(deny_unknown_fields)]
pub struct ReadConsoleInput {
    #[serde(default)]
    #[validate(range(min = 1, max = 10000))]
    #[schemars(description = "Only return the newest N entries (default: all)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[schemars(deny_unknown_fields)]
pub struct ClearConsoleInput {}

pub async fn read(
    state: &Arc<AppState>,
    input: ReadConsoleInput,
) -> Result<serde_json::Value, Error> {
    input
        .validate()
        .map_err(|e| Error::validation(format!("Validation failed: {}", e)))?;

    Ok(json!({
        "entries": state.console.entries(input.limit),
        "panel": state.panel(),
        "busy": {
            "join": state.is_busy(Action::Join),
            "join_emptiest": state.is_busy(Action::JoinEmptiest),
            "presence": state.is_busy(Action::Presence)
        }
    }))
}

pub async fn clear(
    state: &Arc<AppState>,
    _input: ClearConsoleInput,
) -> Result<serde_json::Value, Error> {
    state.console.clear();
    Ok(json!({ "status": "cleared" }))
}
