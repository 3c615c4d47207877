//! Finder configuration.
//!
//! Every field has a default so an empty (or absent) TOML file is valid.
//! The session cookie may also come from `FINDER_SESSION_COOKIE`, which wins
//! over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SESSION_COOKIE_ENV: &str = "FINDER_SESSION_COOKIE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    pub endpoints: Endpoints,
    pub search: SearchSettings,
    pub browser: BrowserSettings,
    /// Place searched when an action names none.
    pub default_place_id: Option<u64>,
    /// Value of the platform's `.ROBLOSECURITY` cookie.
    pub session_cookie: Option<String>,
    pub http_timeout_ms: Option<u64>,
    /// Lines kept in the console scrollback.
    pub console_capacity: Option<usize>,
}

/// Base URLs of the four endpoint families.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub users: String,
    pub thumbnails: String,
    pub presence: String,
    pub games: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            users: "https://api.roblox.com".to_string(),
            thumbnails: "https://www.roblox.com".to_string(),
            presence: "https://presence.roblox.com".to_string(),
            games: "https://www.roblox.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every family at one base URL (used against fake platforms).
    pub fn single(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            users: base.clone(),
            thumbnails: base.clone(),
            presence: base.clone(),
            games: base,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Pages requested concurrently per locate round.
    pub batch_width: u32,
    /// A page with fewer sessions than this is the listing's tail.
    pub full_page_threshold: usize,
    /// Upper page bound of the emptiest-server binary search.
    pub emptiest_upper_bound: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            batch_width: 10,
            full_page_threshold: 10,
            emptiest_upper_bound: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub browser_path: Option<String>,
    pub cdp_url: Option<String>,
    pub headless: bool,
    /// Login profile whose cookies the join page runs with.
    pub profile: Option<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            browser_path: None,
            cdp_url: None,
            headless: true,
            profile: None,
        }
    }
}

impl FinderConfig {
    /// Load from `path` if given, otherwise defaults; then apply the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml(&contents)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => Self::default(),
        };

        if let Ok(cookie) = std::env::var(SESSION_COOKIE_ENV) {
            config.session_cookie = Some(cookie);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.batch_width == 0 {
            anyhow::bail!("search.batch_width must be at least 1");
        }
        if self.search.full_page_threshold == 0 {
            anyhow::bail!("search.full_page_threshold must be at least 1");
        }
        Ok(())
    }

    /// Cookie with surrounding whitespace removed; blank counts as absent.
    pub fn session_cookie(&self) -> Option<&str> {
        self.session_cookie
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
