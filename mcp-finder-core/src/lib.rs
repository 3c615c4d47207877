//! Player server finder core library.
//!
//! Resolves players on the game platform, pages the public server listing
//! to find the session a player is in (or a near-empty one), and joins it
//! through a managed browser. `build_server()` exposes the panel actions as
//! MCP tools, ready to be served over HTTP.

pub mod actions;
pub mod browser;
pub mod config;
pub mod console;
pub mod error;
pub mod identity;
pub mod join;
pub mod locator;
pub mod platform;
pub mod presence;
pub mod profile;
pub mod state;
pub mod tools;
pub mod util;

pub use error::{FinderError, Result};
pub use state::AppState;

use pmcp::types::{ServerCapabilities, ToolCapabilities};
use pmcp::Server;
use std::sync::Arc;

/// Build a fully-configured MCP server over `state`.
pub fn build_server(state: Arc<AppState>) -> pmcp::Result<Server> {
    let builder = Server::builder()
        .name("finder")
        .version(env!("CARGO_PKG_VERSION"))
        .capabilities(ServerCapabilities {
            tools: Some(ToolCapabilities {
                list_changed: Some(true),
            }),
            ..Default::default()
        });

    let builder = tools::register_tools(builder, state);

    builder.build()
}
