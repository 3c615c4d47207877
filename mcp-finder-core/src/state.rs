//! Application state shared by every tool handler.
//!
//! Built once at startup and torn down by `shutdown()`. Holds the panel's
//! input fields and one busy flag per long-running action; a busy action
//! refuses new calls the way the panel disables its button.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::browser::BrowserSession;
use crate::config::FinderConfig;
use crate::console::{Console, DEFAULT_CAPACITY};
use crate::error::{FinderError, Result};
use crate::identity::{Identity, IdentityResolver};
use crate::join::{BrowserJoinLauncher, JoinLauncher};
use crate::locator::ServerLocator;
use crate::platform::{HttpPlatform, PlatformApi};
use crate::presence::PresenceService;
use crate::profile::ProfileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Join,
    JoinEmptiest,
    Presence,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::JoinEmptiest => "join emptiest",
            Self::Presence => "presence lookup",
        }
    }
}

#[derive(Default)]
struct BusyFlags {
    join: AtomicBool,
    join_emptiest: AtomicBool,
    presence: AtomicBool,
}

impl BusyFlags {
    fn flag(&self, action: Action) -> &AtomicBool {
        match action {
            Action::Join => &self.join,
            Action::JoinEmptiest => &self.join_emptiest,
            Action::Presence => &self.presence,
        }
    }
}

/// Held while an action runs; dropping it re-enables the action.
pub struct ActionPermit<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ActionPermit<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Last values of the panel's username and ID fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PanelInputs {
    pub handle: Option<String>,
    pub id: Option<u64>,
}

pub struct AppState {
    pub resolver: IdentityResolver,
    pub locator: ServerLocator,
    pub presence: PresenceService,
    pub launcher: Arc<dyn JoinLauncher>,
    pub console: Console,
    default_place_id: Option<u64>,
    panel: Mutex<PanelInputs>,
    busy: BusyFlags,
    browser: Option<Arc<BrowserSession>>,
}

impl AppState {
    pub fn new(
        api: Arc<dyn PlatformApi>,
        launcher: Arc<dyn JoinLauncher>,
        config: &FinderConfig,
    ) -> Self {
        let state = Self {
            resolver: IdentityResolver::new(api.clone()),
            locator: ServerLocator::new(api.clone(), config.search.clone()),
            presence: PresenceService::new(api),
            launcher,
            console: Console::new(config.console_capacity.unwrap_or(DEFAULT_CAPACITY)),
            default_place_id: config.default_place_id,
            panel: Mutex::new(PanelInputs::default()),
            busy: BusyFlags::default(),
            browser: None,
        };
        state.console.success("Modules loaded!");
        state
    }

    /// Wire the HTTP platform client and the browser-backed join launcher.
    pub fn from_config(config: &FinderConfig, profiles: Arc<ProfileStore>) -> Result<Self> {
        let api = Arc::new(HttpPlatform::new(
            config.endpoints.clone(),
            config.session_cookie().map(str::to_string),
            config.http_timeout_ms.map(Duration::from_millis),
        )?);

        let browser = Arc::new(BrowserSession::new(config.browser.clone(), profiles));
        let launcher = Arc::new(BrowserJoinLauncher::new(
            browser.clone(),
            &config.endpoints.games,
        ));

        let mut state = Self::new(api, launcher, config);
        state.browser = Some(browser);
        Ok(state)
    }

    pub fn acquire(&self, action: Action) -> Result<ActionPermit<'_>> {
        let flag = self.busy.flag(action);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FinderError::Busy(action.name()))?;
        Ok(ActionPermit { flag })
    }

    pub fn is_busy(&self, action: Action) -> bool {
        self.busy.flag(action).load(Ordering::Acquire)
    }

    pub fn panel(&self) -> PanelInputs {
        self.panel.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) fn remember(&self, identity: &Identity) {
        let mut panel = self.panel.lock().unwrap_or_else(|e| e.into_inner());
        panel.handle = Some(identity.handle.clone());
        panel.id = Some(identity.id);
    }

    pub(crate) fn remember_handle(&self, handle: &str) {
        let mut panel = self.panel.lock().unwrap_or_else(|e| e.into_inner());
        if panel.handle.as_deref() != Some(handle) {
            panel.handle = Some(handle.to_string());
            panel.id = None;
        }
    }

    /// Record an id typed straight into the panel. The handle is kept only
    /// while it still belongs to that id.
    pub(crate) fn remember_id(&self, id: u64, handle: Option<String>) {
        let mut panel = self.panel.lock().unwrap_or_else(|e| e.into_inner());
        if handle.is_some() {
            panel.handle = handle;
        } else if panel.id != Some(id) {
            panel.handle = None;
        }
        panel.id = Some(id);
    }

    /// `place_id`, else the configured default place.
    pub fn place_or_default(&self, place_id: Option<u64>) -> Result<u64> {
        place_id.or(self.default_place_id).ok_or_else(|| {
            FinderError::InvalidInput(
                "no place_id given and no default_place_id configured".to_string(),
            )
        })
    }

    pub async fn shutdown(&self) {
        if let Some(ref browser) = self.browser {
            browser.shutdown().await;
        }
    }
}

/// State over a fake platform with a recording launcher and default place 1.
#[cfg(test)]
pub(crate) fn fake_state(
    fake: crate::platform::fake::FakePlatform,
) -> (Arc<AppState>, Arc<crate::join::recording::RecordingLauncher>) {
    let launcher = Arc::new(crate::join::recording::RecordingLauncher::default());
    let state = AppState::new(
        Arc::new(fake),
        launcher.clone(),
        &FinderConfig {
            default_place_id: Some(1),
            ..Default::default()
        },
    );
    (Arc::new(state), launcher)
}
