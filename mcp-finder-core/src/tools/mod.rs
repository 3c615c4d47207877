//! Tool registration: one tool per panel action plus the console pane.

pub mod console;
pub mod join_emptiest;
pub mod join_player;
pub mod lookup_presence;
pub mod resolve_id;
pub mod resolve_username;

use crate::state::AppState;
use pmcp::TypedTool;
use std::sync::Arc;

/// Register all finder tools onto the server builder.
///
/// Each tool captures an `Arc<AppState>`.
pub fn register_tools(builder: pmcp::ServerBuilder, state: Arc<AppState>) -> pmcp::ServerBuilder {
    // --- Identity ---

    let s = state.clone();
    let builder = builder.tool(
        "resolve_id",
        TypedTool::new("resolve_id", move |input: resolve_id::ResolveIdInput, _extra| {
            let s = s.clone();
            Box::pin(async move { resolve_id::execute(&s, input).await })
        })
        .with_description("Look up a player's numeric user id from their username."),
    );

    let s = state.clone();
    let builder = builder.tool(
        "resolve_username",
        TypedTool::new(
            "resolve_username",
            move |input: resolve_username::ResolveUsernameInput, _extra| {
                let s = s.clone();
                Box::pin(async move { resolve_username::execute(&s, input).await })
            },
        )
        .with_description("Look up a player's username from their numeric user id."),
    );

    // --- Joining ---

    let s = state.clone();
    let builder = builder.tool(
        "join_player",
        TypedTool::new(
            "join_player",
            move |input: join_player::JoinPlayerInput, _extra| {
                let s = s.clone();
                Box::pin(async move { join_player::execute(&s, input).await })
            },
        )
        .with_description(
            "Search a place's public servers for the player (by avatar) and join the server they are in. \
             Returns status 'joined' with the session, or 'not_found' once the listing is exhausted.",
        ),
    );

    let s = state.clone();
    let builder = builder.tool(
        "join_emptiest",
        TypedTool::new(
            "join_emptiest",
            move |input: join_emptiest::JoinEmptiestInput, _extra| {
                let s = s.clone();
                Box::pin(async move { join_emptiest::execute(&s, input).await })
            },
        )
        .with_description(
            "Join a low-population server: binary-searches the listing for its last partially filled page.",
        ),
    );

    // --- Presence & console ---

    let s = state.clone();
    let builder = builder.tool(
        "lookup_presence",
        TypedTool::new(
            "lookup_presence",
            move |input: lookup_presence::LookupPresenceInput, _extra| {
                let s = s.clone();
                Box::pin(async move { lookup_presence::execute(&s, input).await })
            },
        )
        .with_description(
            "Show where a player was last seen and when. Needs a logged-in session cookie.",
        ),
    );

    let s = state.clone();
    let builder = builder.tool(
        "read_console",
        TypedTool::new(
            "read_console",
            move |input: console::ReadConsoleInput, _extra| {
                let s = s.clone();
                Box::pin(async move { console::read(&s, input).await })
            },
        )
        .with_description(
            "Read the console log (colour-coded entries), the remembered username/id and which actions are busy.",
        ),
    );

    let s = state;
    let builder = builder.tool(
        "clear_console",
        TypedTool::new(
            "clear_console",
            move |input: console::ClearConsoleInput, _extra| {
                let s = s.clone();
                Box::pin(async move { console::clear(&s, input).await })
            },
        )
        .with_description("Clear the console log."),
    );

    builder
}
