//! Managed Chrome instance the join credential runs in.
//!
//! One browser and one page, created lazily on first use. With a login
//! profile the browser starts with that profile's `--user-data-dir`, so the
//! page carries the operator's platform session.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::Handler;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::BrowserSettings;
use crate::profile::ProfileStore;

const WINDOW_SIZE: (u32, u32) = (1280, 720);

pub struct BrowserSession {
    browser: RwLock<Option<Browser>>,
    page: RwLock<Option<Page>>,
    settings: BrowserSettings,
    profiles: Arc<ProfileStore>,
}

impl BrowserSession {
    pub fn new(settings: BrowserSettings, profiles: Arc<ProfileStore>) -> Self {
        Self {
            browser: RwLock::new(None),
            page: RwLock::new(None),
            settings,
            profiles,
        }
    }

    async fn ensure_browser(&self) -> Result<()> {
        if self.browser.read().await.is_some() {
            return Ok(());
        }

        let mut slot = self.browser.write().await;
        if slot.is_some() {
            return Ok(());
        }

        let browser = match self.settings.cdp_url {
            Some(ref cdp_url) => {
                let (browser, handler) = Browser::connect(cdp_url)
                    .await
                    .with_context(|| format!("Failed to connect to browser at {}", cdp_url))?;
                drive(handler);
                browser
            }
            None => {
                let user_data_dir = match self.settings.profile {
                    Some(ref name) => {
                        let dir = self.profiles.user_data_dir(name)?;
                        if let Err(e) = self.profiles.touch(name) {
                            tracing::warn!(profile = %name, error = %e, "could not record profile use");
                        }
                        Some(dir)
                    }
                    None => None,
                };

                let config = launch_config(
                    self.settings.browser_path.as_deref(),
                    self.settings.headless,
                    WINDOW_SIZE,
                    user_data_dir,
                )?;
                let (browser, handler) = Browser::launch(config)
                    .await
                    .context("Failed to launch browser")?;
                drive(handler);
                browser
            }
        };

        tracing::info!(headless = self.settings.headless, "browser ready");
        *slot = Some(browser);
        Ok(())
    }

    /// The single page joins run in, created on first use.
    pub async fn page(&self) -> Result<Page> {
        self.ensure_browser().await?;

        if let Some(ref page) = *self.page.read().await {
            return Ok(page.clone());
        }

        let mut slot = self.page.write().await;
        if let Some(ref page) = *slot {
            return Ok(page.clone());
        }

        let page = {
            let browser = self.browser.read().await;
            browser
                .as_ref()
                .context("Browser not initialized")?
                .new_page("about:blank")
                .await
                .context("Failed to create new page")?
        };

        *slot = Some(page.clone());
        Ok(page)
    }

    /// Close the browser if one was started.
    pub async fn shutdown(&self) {
        self.page.write().await.take();
        if let Some(mut browser) = self.browser.write().await.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!(error = %e, "browser did not close cleanly");
            }
        }
    }

    /// Launch a headed browser at `url` for the operator to log in with
    /// `profile_name` (used by `setup-login`).
    pub async fn launch_for_login(
        profiles: &ProfileStore,
        profile_name: &str,
        url: &str,
        browser_path: Option<&str>,
    ) -> Result<Browser> {
        let user_data_dir = profiles.user_data_dir(profile_name)?;
        let config = launch_config(browser_path, false, (1280, 900), Some(user_data_dir))?;

        let (browser, handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser for login")?;
        drive(handler);

        browser
            .new_page(url)
            .await
            .context("Failed to open login page")?;

        tracing::info!(%url, profile = %profile_name, "login browser opened");
        Ok(browser)
    }
}

fn launch_config(
    browser_path: Option<&str>,
    headless: bool,
    window_size: (u32, u32),
    user_data_dir: Option<PathBuf>,
) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder();

    if let Some(path) = browser_path {
        builder = builder.chrome_executable(path);
    }
    if !headless {
        builder = builder.with_head();
    }
    if let Some(dir) = user_data_dir {
        builder = builder.user_data_dir(dir);
    }

    builder
        .window_size(window_size.0, window_size.1)
        .arg("--disable-dev-shm-usage")
        .arg("--remote-allow-origins=*")
        .build()
        .map_err(|e| anyhow::anyhow!("{}", e))
}

/// Pump CDP events until the connection drops.
fn drive(mut handler: Handler) {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });
}
