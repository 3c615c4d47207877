//! Player server finder binary.
//!
//! Provides three subcommands:
//! - `serve` (default): Start the MCP server over Streamable HTTP
//! - `setup-login`: Open a browser to log in to the platform, save the profile for joins
//! - `find`: One-shot search for a player's server, optionally joining it

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mcp_finder_core::actions::Target;
use mcp_finder_core::browser::BrowserSession;
use mcp_finder_core::config::FinderConfig;
use mcp_finder_core::locator::SearchProgress;
use mcp_finder_core::profile::ProfileStore;
use mcp_finder_core::AppState;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_LOGIN_URL: &str = "https://www.roblox.com/login";

#[derive(Parser)]
#[command(name = "finder-server", about = "Player Server Finder MCP Server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (default when no subcommand given)
    Serve(ServeArgs),

    /// Open browser for manual login, save profile for joins
    SetupLogin(SetupLoginArgs),

    /// Search once for a player's server and print the result as JSON
    Find(FindArgs),
}

/// Options shared by subcommands that build the finder state.
#[derive(Args, Default)]
struct StateArgs {
    /// TOML config file (endpoints, search settings, default place, browser)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Named login profile the join browser runs with
    #[clap(long)]
    profile: Option<String>,

    /// Run the join browser headless (default: true)
    #[clap(long)]
    headless: Option<bool>,

    /// Custom Chrome/Edge binary path
    #[clap(long)]
    browser_path: Option<String>,

    /// Connect to an already-running browser via CDP URL
    #[clap(long)]
    cdp_url: Option<String>,
}

impl StateArgs {
    fn load_config(&self) -> anyhow::Result<FinderConfig> {
        let mut config = FinderConfig::load(self.config.as_deref())?;
        let browser = &mut config.browser;
        if let Some(ref profile) = self.profile {
            browser.profile = Some(profile.clone());
        }
        if let Some(headless) = self.headless {
            browser.headless = headless;
        }
        if let Some(ref path) = self.browser_path {
            browser.browser_path = Some(path.clone());
        }
        if let Some(ref url) = self.cdp_url {
            browser.cdp_url = Some(url.clone());
        }
        Ok(config)
    }

    fn build_state(&self, place_id: Option<u64>) -> anyhow::Result<Arc<AppState>> {
        let mut config = self.load_config()?;
        if place_id.is_some() {
            config.default_place_id = place_id;
        }
        let profiles = Arc::new(ProfileStore::open()?);
        let state = AppState::from_config(&config, profiles)
            .context("Failed to initialise the finder")?;
        Ok(Arc::new(state))
    }
}

#[derive(Parser)]
struct ServeArgs {
    #[clap(flatten)]
    server: server_common::CliArgs,

    #[clap(flatten)]
    state: StateArgs,

    /// Default place id for actions that do not name one
    #[clap(long)]
    place_id: Option<u64>,
}

#[derive(Parser)]
struct SetupLoginArgs {
    /// Profile name to create or reuse
    #[clap(long)]
    profile: String,

    /// URL to navigate to for login
    #[clap(long, default_value = DEFAULT_LOGIN_URL)]
    url: String,

    /// Timeout in seconds to wait for user to complete login
    #[clap(long, default_value = "300")]
    timeout_secs: u64,

    /// Custom Chrome/Edge binary path
    #[clap(long)]
    browser_path: Option<String>,
}

#[derive(Parser)]
struct FindArgs {
    /// Target username
    #[clap(long, conflicts_with = "id", required_unless_present = "id")]
    username: Option<String>,

    /// Target user id
    #[clap(long)]
    id: Option<u64>,

    /// Place id whose servers to search
    #[clap(long)]
    place_id: Option<u64>,

    /// Join the server once found (needs a login profile)
    #[clap(long)]
    join: bool,

    #[clap(flatten)]
    state: StateArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => run_serve(ServeArgs::parse_from(["finder-server"])).await,
        Some(Command::Serve(args)) => run_serve(args).await,
        Some(Command::SetupLogin(args)) => run_setup_login(args).await,
        Some(Command::Find(args)) => run_find(args).await,
    }
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    server_common::init_logging();

    let state = args.state.build_state(args.place_id)?;
    let server = mcp_finder_core::build_server(state.clone())?;

    let result = tokio::select! {
        result = server_common::run_http(server, &args.server) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, shutting down browser");
            Ok(())
        }
    };

    state.shutdown().await;
    result
}

async fn run_setup_login(args: SetupLoginArgs) -> anyhow::Result<()> {
    server_common::init_logging();

    let profiles = ProfileStore::open()?;
    profiles.get_or_create(&args.profile, &args.url)?;

    tracing::info!(
        profile = %args.profile,
        url = %args.url,
        "Launching browser for manual login"
    );

    let mut browser = BrowserSession::launch_for_login(
        &profiles,
        &args.profile,
        &args.url,
        args.browser_path.as_deref(),
    )
    .await?;

    println!();
    println!("Browser opened at: {}", args.url);
    println!(
        "Please log in. Press Enter when done (or wait {}s)...",
        args.timeout_secs
    );
    println!();

    let timeout = tokio::time::Duration::from_secs(args.timeout_secs);
    let stdin_future = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)
    });

    tokio::select! {
        _ = stdin_future => {}
        _ = tokio::time::sleep(timeout) => {
            println!("Timeout reached.");
        }
    }

    if let Err(e) = browser.close().await {
        tracing::warn!(error = %e, "login browser did not close cleanly");
    }
    profiles.touch(&args.profile)?;

    println!();
    println!("Profile '{}' saved.", args.profile);
    println!("Use --profile {} to join with this session.", args.profile);

    Ok(())
}

async fn run_find(args: FindArgs) -> anyhow::Result<()> {
    server_common::init_logging();

    let state = args.state.build_state(None)?;
    let target = Target::new(args.username, args.id);

    let output = if args.join {
        let outcome = state.join_player(target, args.place_id).await?;
        serde_json::to_value(outcome)?
    } else {
        let place_id = state.place_or_default(args.place_id)?;
        let user_id = match (target.id, target.handle) {
            (Some(id), _) => id,
            (None, Some(handle)) => state.resolve_id(&handle).await?.id,
            (None, None) => anyhow::bail!("--username or --id is required"),
        };
        let fingerprint = state.resolver.resolve_fingerprint(user_id).await?;
        let report = |p: SearchProgress| {
            tracing::info!(pages_checked = p.pages_checked, "Servers checked: {}", p.pages_checked);
        };
        let outcome = state.locator.locate(place_id, &fingerprint, &report).await?;
        serde_json::to_value(outcome)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    state.shutdown().await;
    Ok(())
}
