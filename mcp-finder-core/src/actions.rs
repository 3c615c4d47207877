//! The panel's actions: resolve ID, resolve name, join player, join
//! emptiest server and presence lookup.
//!
//! Each action reports to the console the way the panel did and returns a
//! structured result for the caller.

use serde::Serialize;

use crate::error::{FinderError, Result};
use crate::identity::Identity;
use crate::join::JoinAck;
use crate::locator::{LocateOutcome, SearchProgress, SessionMatch};
use crate::presence::PresenceLookup;
use crate::state::{Action, AppState};

const PRESENCE_SEPARATOR: &str = "---------------------------";

/// Who to act on. `id` wins over `handle`; with neither, the panel's last
/// values are used.
#[derive(Debug, Clone, Default)]
pub struct Target {
    pub handle: Option<String>,
    pub id: Option<u64>,
}

impl Target {
    pub fn new(handle: Option<String>, id: Option<u64>) -> Self {
        Self {
            handle: handle
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty()),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub guid: Option<String>,
    pub page: u32,
    pub session_index: usize,
    pub occupant_index: Option<usize>,
    pub players: usize,
    pub capacity: Option<u32>,
}

impl From<&SessionMatch> for SessionSummary {
    fn from(m: &SessionMatch) -> Self {
        Self {
            guid: m.session.guid.clone(),
            page: m.page,
            session_index: m.session_index,
            occupant_index: m.occupant_index,
            players: m.session.occupants.len(),
            capacity: m.session.capacity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JoinOutcome {
    Joined {
        place_id: u64,
        target_id: Option<u64>,
        session: SessionSummary,
        rounds: u32,
        ack: JoinAck,
    },
    NotFound {
        place_id: u64,
        target_id: Option<u64>,
        pages_checked: u32,
        rounds: u32,
    },
}

impl AppState {
    pub async fn resolve_id(&self, handle: &str) -> Result<Identity> {
        let handle = handle.trim();
        if handle.is_empty() {
            self.console.warning("Enter a username first.");
            return Err(FinderError::InvalidInput("username is required".to_string()));
        }
        self.remember_handle(handle);

        match self.resolver.resolve_id(handle).await {
            Ok(identity) => {
                self.remember(&identity);
                self.console.success(format!("Found ID: {}", identity.id));
                Ok(identity)
            }
            Err(e) => {
                self.report_lookup_failure(&e, "Invalid username.");
                Err(e)
            }
        }
    }

    pub async fn resolve_username(&self, id: u64) -> Result<Identity> {
        match self.resolver.resolve_handle(id).await {
            Ok(identity) => {
                self.remember(&identity);
                self.console
                    .success(format!("Found username: {}", identity.handle));
                Ok(identity)
            }
            Err(e) => {
                self.report_lookup_failure(&e, "Invalid ID.");
                Err(e)
            }
        }
    }

    /// Find the target's server on `place_id` and join it.
    pub async fn join_player(&self, target: Target, place_id: Option<u64>) -> Result<JoinOutcome> {
        let place_id = self.place_or_default(place_id)?;
        let _permit = self.acquire(Action::Join)?;

        let user_id = self.target_id(target).await?;

        let fingerprint = match self.resolver.resolve_fingerprint(user_id).await {
            Ok(fp) => fp,
            Err(e) => {
                self.report_lookup_failure(&e, "Invalid ID.");
                return Err(e);
            }
        };

        tracing::info!(place_id, user_id, %fingerprint, "searching servers");
        let progress_line = self.console.info("Servers checked: 0");
        let on_progress = |p: SearchProgress| {
            self.console
                .update(progress_line, format!("Servers checked: {}", p.pages_checked));
        };

        let outcome = match self.locator.locate(place_id, &fingerprint, &on_progress).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.console.error(format!("Search failed: {}", e));
                return Err(e);
            }
        };

        match outcome {
            LocateOutcome::Found(found) => {
                self.console.success("Joining player.");
                let ack = self.submit(place_id, &found).await?;
                Ok(JoinOutcome::Joined {
                    place_id,
                    target_id: Some(user_id),
                    session: SessionSummary::from(&found),
                    rounds: found.rounds,
                    ack,
                })
            }
            LocateOutcome::Exhausted {
                pages_checked,
                rounds,
            } => {
                self.console.error("Unable to find player.");
                Ok(JoinOutcome::NotFound {
                    place_id,
                    target_id: Some(user_id),
                    pages_checked,
                    rounds,
                })
            }
        }
    }

    /// Join the last server on the listing's tail page.
    pub async fn join_emptiest(&self, place_id: Option<u64>) -> Result<JoinOutcome> {
        let place_id = self.place_or_default(place_id)?;
        let _permit = self.acquire(Action::JoinEmptiest)?;

        let outcome = match self.locator.locate_emptiest(place_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.console.error(format!("Search failed: {}", e));
                return Err(e);
            }
        };

        match outcome {
            LocateOutcome::Found(found) => {
                self.console
                    .info(format!("Total Players: {}", found.session.occupants.len()));
                self.console.success("Joining smallest server.");
                let ack = self.submit(place_id, &found).await?;
                Ok(JoinOutcome::Joined {
                    place_id,
                    target_id: None,
                    session: SessionSummary::from(&found),
                    rounds: found.rounds,
                    ack,
                })
            }
            LocateOutcome::Exhausted {
                pages_checked,
                rounds,
            } => {
                self.console.error("Unable to find a server with free space.");
                Ok(JoinOutcome::NotFound {
                    place_id,
                    target_id: None,
                    pages_checked,
                    rounds,
                })
            }
        }
    }

    /// Report where the target was last seen. Lookup failures are logged,
    /// not raised.
    pub async fn lookup_presence(&self, target: Target) -> Result<PresenceLookup> {
        let _permit = self.acquire(Action::Presence)?;

        let user_id = self.target_id(target).await?;
        let handle = match self.panel().handle {
            Some(handle) => handle,
            None => match self.resolver.resolve_handle(user_id).await {
                Ok(identity) => {
                    self.remember(&identity);
                    identity.handle
                }
                Err(_) => "unknown".to_string(),
            },
        };

        self.console.info(format!("Username: {}", handle));
        self.console.info(format!("ID: {}", user_id));

        let lookup = self.presence.lookup(user_id).await;
        match lookup {
            PresenceLookup::Found(ref report) => {
                for line in report.lines() {
                    self.console.info(line);
                }
                self.console.greyed(PRESENCE_SEPARATOR);
            }
            PresenceLookup::Unavailable { ref reason } => {
                self.console.error("Unable to find information.");
                tracing::debug!(user_id, %reason, "presence unavailable");
            }
        }
        Ok(lookup)
    }

    /// Numeric id for `target`, resolving a handle when that is all we have.
    async fn target_id(&self, target: Target) -> Result<u64> {
        let target = if target.id.is_none() && target.handle.is_none() {
            let panel = self.panel();
            Target {
                handle: panel.handle,
                id: panel.id,
            }
        } else {
            target
        };

        match (target.id, target.handle) {
            (Some(id), handle) => {
                self.remember_id(id, handle);
                Ok(id)
            }
            (None, Some(handle)) => Ok(self.resolve_id(&handle).await?.id),
            (None, None) => {
                self.console.warning("Enter a username or ID first.");
                Err(FinderError::InvalidInput(
                    "a username or user id is required".to_string(),
                ))
            }
        }
    }

    async fn submit(&self, place_id: u64, found: &SessionMatch) -> Result<JoinAck> {
        self.launcher
            .submit_join_token(
                place_id,
                found.session.guid.as_deref(),
                &found.session.join_credential,
            )
            .await
            .map_err(|e| {
                self.console.error(format!("Join failed: {}", e));
                FinderError::from(e)
            })
    }

    fn report_lookup_failure(&self, err: &FinderError, not_found_message: &str) {
        match err {
            FinderError::NotFound(_) => self.console.error(not_found_message),
            other => self.console.error(other.to_string()),
        };
    }
}
