//! Shared bootstrap for the finder binaries.
//!
//! `finder-server serve` hands its finder tools to `run_http()`, which
//! exposes them at `http://<host>:<port>/mcp`. Every subcommand (`serve`,
//! `setup-login`, `find`) calls `init_logging()` first so console lines
//! (target `finder::console`) and search progress reach stderr.

use pmcp::server::streamable_http_server::{StreamableHttpServer, StreamableHttpServerConfig};
use pmcp::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter when `RUST_LOG` is unset. The join browser's CDP handler
/// logs every unrecognised protocol event, so it is held at `warn`.
pub const DEFAULT_LOG_FILTER: &str = "info,chromiumoxide=warn";

/// Where `finder-server serve` listens for MCP clients.
#[derive(Debug, Clone, clap::Args)]
pub struct CliArgs {
    /// Host to bind to
    #[clap(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to
    #[clap(long, default_value = "3180")]
    pub port: u16,
}

impl CliArgs {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// The Streamable HTTP endpoint MCP clients connect to.
    pub fn mcp_url(&self) -> String {
        format!("http://{}:{}/mcp", self.host, self.port)
    }
}

/// Serve the finder's MCP tools over Streamable HTTP until the listener
/// exits. Responses are plain JSON; no server-side session ids are issued.
pub async fn run_http(server: Server, args: &CliArgs) -> anyhow::Result<()> {
    init_logging();

    let addr = args.socket_addr()?;

    tracing::info!(host = %args.host, port = args.port, "Starting finder MCP server");

    let server = Arc::new(Mutex::new(server));

    let config = StreamableHttpServerConfig {
        session_id_generator: None,
        enable_json_response: true,
        event_store: None,
        on_session_initialized: None,
        on_session_closed: None,
        http_middleware: None,
    };

    let http_server = StreamableHttpServer::with_config(addr, server, config);
    let (_bound_addr, server_handle) = http_server.start().await?;

    tracing::info!(url = %args.mcp_url(), "Finder tools available");

    server_handle.await?;

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`].
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
