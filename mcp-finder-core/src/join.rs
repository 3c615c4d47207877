//! Submitting a session's join credential.
//!
//! The credential is platform-issued script. It is never interpreted here:
//! `JoinLauncher` implementations hand it to something that runs it in the
//! platform's own context. `BrowserJoinLauncher` evaluates it inside a page
//! on the platform origin in the managed browser.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::browser::BrowserSession;

/// Opaque join token from the listing's `JoinScript` field.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinCredential(String);

impl JoinCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for JoinCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JoinCredential({} bytes)", self.0.len())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinAck {
    pub place_id: u64,
    pub session_guid: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("session has no join credential")]
    EmptyCredential,

    #[error("join browser unavailable: {0}")]
    Browser(String),

    #[error("platform rejected the join: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait JoinLauncher: Send + Sync {
    /// Submit `credential` for a session of `place_id`. Fire-and-forget: the
    /// ack means the credential was handed over, not that the client joined.
    async fn submit_join_token(
        &self,
        place_id: u64,
        session_guid: Option<&str>,
        credential: &JoinCredential,
    ) -> Result<JoinAck, JoinError>;
}

pub struct BrowserJoinLauncher {
    browser: Arc<BrowserSession>,
    games_base: String,
}

impl BrowserJoinLauncher {
    pub fn new(browser: Arc<BrowserSession>, games_base: &str) -> Self {
        Self {
            browser,
            games_base: games_base.trim_end_matches('/').to_string(),
        }
    }

    fn place_url(&self, place_id: u64) -> String {
        format!("{}/games/{}", self.games_base, place_id)
    }
}

#[async_trait]
impl JoinLauncher for BrowserJoinLauncher {
    async fn submit_join_token(
        &self,
        place_id: u64,
        session_guid: Option<&str>,
        credential: &JoinCredential,
    ) -> Result<JoinAck, JoinError> {
        if credential.is_empty() {
            return Err(JoinError::EmptyCredential);
        }

        let page = self
            .browser
            .page()
            .await
            .map_err(|e| JoinError::Browser(e.to_string()))?;

        let url = self.place_url(place_id);
        page.goto(&url)
            .await
            .map_err(|e| JoinError::Browser(format!("Navigation to {} failed: {}", url, e)))?;

        page.evaluate_expression(credential.expose().to_string())
            .await
            .map_err(|e| JoinError::Rejected(e.to_string()))?;

        tracing::info!(place_id, session = ?session_guid, "join credential submitted");

        Ok(JoinAck {
            place_id,
            session_guid: session_guid.map(str::to_string),
            submitted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::sync::Mutex;

    /// Launcher that records submissions instead of joining.
    #[derive(Default)]
    pub struct RecordingLauncher {
        pub submitted: Mutex<Vec<(u64, JoinCredential)>>,
    }

    #[async_trait]
    impl JoinLauncher for RecordingLauncher {
        async fn submit_join_token(
            &self,
            place_id: u64,
            session_guid: Option<&str>,
            credential: &JoinCredential,
        ) -> Result<JoinAck, JoinError> {
            if credential.is_empty() {
                return Err(JoinError::EmptyCredential);
            }
            self.submitted
                .lock()
                .unwrap()
                .push((place_id, credential.clone()));
            Ok(JoinAck {
                place_id,
                session_guid: session_guid.map(str::to_string),
                submitted_at: Utc::now(),
            })
        }
    }
}
